//! JMap on-disk header structures.

use gapa_common::be::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// JMap file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct JMapHeader {
    /// Number of entries (rows).
    pub entry_count: U32,
    /// Number of fields (columns).
    pub field_count: U32,
    /// Offset of the first entry.
    pub data_offset: U32,
    /// Size of one entry in bytes.
    pub entry_size: U32,
}

impl JMapHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 0x10;
}

/// A field descriptor as stored in the file.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawField {
    /// Hash of the field name.
    pub hash: U32,
    /// Bit mask applied to integer values.
    pub mask: U32,
    /// Offset of the value inside an entry.
    pub offset: U16,
    /// Right shift applied after masking.
    pub shift: u8,
    /// Field type tag.
    pub field_type: u8,
}

impl RawField {
    /// Size of a field descriptor in bytes.
    pub const SIZE: usize = 0xC;
}
