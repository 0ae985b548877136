//! Shift-JIS string helpers.
//!
//! Table strings and field names in the game's data are Shift-JIS encoded.
//! Decoding is strict so that a decoded string always re-encodes to the
//! exact bytes it came from.

use encoding_rs::SHIFT_JIS;

use crate::{Error, Result};

/// Decode Shift-JIS bytes. `offset` is only used for error reporting.
pub fn decode(bytes: &[u8], offset: usize) -> Result<String> {
    SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(Error::InvalidString { offset })
}

/// Encode a string as Shift-JIS.
pub fn encode(text: &str) -> Result<Vec<u8>> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        return Err(Error::Unencodable {
            text: text.to_string(),
        });
    }
    Ok(bytes.into_owned())
}

/// Encode a string as Shift-JIS followed by a NUL terminator.
pub fn encode_cstring(text: &str) -> Result<Vec<u8>> {
    let mut bytes = encode(text)?;
    bytes.push(0);
    Ok(bytes)
}
