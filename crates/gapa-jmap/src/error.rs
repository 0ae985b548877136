//! Error types for JMap parsing and writing.

use gapa_common::ErrorKind;
use thiserror::Error;

use crate::FieldType;

/// Errors that can occur when parsing or writing JMap tables.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] gapa_common::Error),

    /// The buffer is shorter than the header declares.
    #[error("truncated {section}: needed {needed} bytes but only {available} available")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },

    /// Entries declared with a zero entry size.
    #[error("{entry_count} entries declared with entry size 0")]
    ZeroEntrySize { entry_count: usize },

    /// Unknown field type tag.
    #[error("field #{index} has unknown type {tag:#04x}")]
    UnknownFieldType { index: usize, tag: u8 },

    /// A field does not fit inside the declared entry size.
    #[error("field {field} at offset {offset} ({size} bytes) exceeds entry size {entry_size}")]
    FieldOutsideEntry {
        field: String,
        offset: u16,
        size: usize,
        entry_size: u32,
    },

    /// A string offset points outside the string pool.
    #[error("entry {entry} field {field}: string offset {offset:#x} out of bounds (pool size: {pool_size})")]
    StringOffsetOutOfBounds {
        entry: usize,
        field: String,
        offset: u32,
        pool_size: usize,
    },

    /// A field with that name already exists.
    #[error("field {0} already exists")]
    DuplicateField(String),

    /// No field with that name exists.
    #[error("field {0} not found")]
    FieldNotFound(String),

    /// An entry does not have exactly one value per field.
    #[error("entry {entry} has {actual} values, table has {expected} fields")]
    EntryArity {
        entry: usize,
        expected: usize,
        actual: usize,
    },

    /// A value does not match its field's type.
    #[error("entry {entry} field {field}: expected a {expected:?} value")]
    TypeMismatch {
        entry: usize,
        field: String,
        expected: FieldType,
    },

    /// An inline string is wider than its fixed buffer.
    #[error("entry {entry} field {field}: string is {length} bytes, inline strings hold {max}")]
    StringTooLong {
        entry: usize,
        field: String,
        length: usize,
        max: usize,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Common(e) => e.kind(),
            Self::Truncated { .. }
            | Self::ZeroEntrySize { .. }
            | Self::UnknownFieldType { .. }
            | Self::FieldOutsideEntry { .. }
            | Self::StringOffsetOutOfBounds { .. } => ErrorKind::Format,
            Self::DuplicateField(_)
            | Self::FieldNotFound(_)
            | Self::EntryArity { .. }
            | Self::TypeMismatch { .. }
            | Self::StringTooLong { .. } => ErrorKind::Validation,
        }
    }
}

/// Result type for JMap operations.
pub type Result<T> = std::result::Result<T, Error>;
