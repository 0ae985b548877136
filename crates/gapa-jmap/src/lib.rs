//! JMap (BCSV) binary table parser and writer.
//!
//! JMap is the "binary CSV" format used all over Super Mario Galaxy: a
//! table of fixed-stride entries whose columns are described by hashed
//! field names, with strings stored either inline or in a shared pool.
//! This crate reads such tables into a [`JMapInfo`] and writes them back
//! byte-for-byte.
//!
//! # File Format
//!
//! All values are big-endian:
//! - 16 bytes: entry count, field count, entry data offset, entry size
//! - 12 bytes per field: name hash, bit mask, entry offset, shift, type
//! - entry count × entry size bytes of entry data
//! - String pool of NUL-terminated Shift-JIS strings
//! - `@` padding up to a 32-byte boundary
//!
//! # Example
//!
//! ```no_run
//! use gapa_jmap::{FieldType, JMapInfo, Value};
//!
//! let mut table = JMapInfo::new();
//! table.new_field("name", FieldType::StringOffset)?;
//! table.new_field("id", FieldType::Long)?;
//! table.push_entry(vec![Value::from("Kinopio"), Value::Int(0)])?;
//!
//! let bytes = table.to_bytes()?;
//! assert_eq!(JMapInfo::parse(&bytes)?.entries().len(), 1);
//! # Ok::<(), gapa_jmap::Error>(())
//! ```

mod error;
mod field;
mod hash;
mod header;
mod info;
mod value;

pub use error::{Error, Result};
pub use field::{FieldName, FieldType, JMapField};
pub use hash::{calc_hash, find_name, is_known_hash};
pub use header::{JMapHeader, RawField};
pub use info::{JMapEntry, JMapInfo};
pub use value::Value;
