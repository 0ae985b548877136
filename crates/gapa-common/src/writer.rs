//! Big-endian output buffer.

use byteorder::{BigEndian, ByteOrder};
use zerocopy::{Immutable, IntoBytes};

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// A growable big-endian byte buffer.
///
/// Mirrors [`BinaryReader`](crate::BinaryReader): every `put_*` appends,
/// every `patch_*` overwrites an already written location (used for counts
/// and offsets that are only known once the payload has been produced).
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.data.len()
    }

    /// Append raw bytes.
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append a big-endian i16.
    pub fn put_i16(&mut self, value: i16) {
        let mut buf = [0u8; 2];
        BigEndian::write_i16(&mut buf, value);
        self.put_bytes(&buf);
    }

    /// Append a zerocopy struct verbatim.
    pub fn put_struct<T: IntoBytes + Immutable>(&mut self, value: &T) {
        self.put_bytes(value.as_bytes());
    }

    /// Pad with `pad` until the length is a multiple of `alignment`.
    pub fn align(&mut self, alignment: usize, pad: u8) {
        let target = align_up(self.data.len(), alignment);
        self.data.resize(target, pad);
    }

    /// Overwrite a big-endian u32 at `offset`.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        BigEndian::write_u32(&mut self.data[offset..offset + 4], value);
    }

    /// Consume the writer and return the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}
