//! Error types for gapa-common.

use thiserror::Error;

/// Broad classification of every error a gapa codec can raise.
///
/// Each crate keeps its own detailed error enum; `kind()` maps those
/// variants onto this shared taxonomy so callers can react uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Binary layout violates structural expectations.
    Format,
    /// A required field or block is missing, or a value is unusable.
    Validation,
    /// A name or index does not resolve to an existing entry.
    Reference,
    /// Underlying read/write failure.
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Format => "format error",
            Self::Validation => "validation error",
            Self::Reference => "reference error",
            Self::Io => "I/O error",
        };
        f.write_str(name)
    }
}

/// Common error type for gapa operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic at {offset:#x}: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        offset: usize,
        expected: String,
        actual: String,
    },

    /// Missing null terminator in string.
    #[error("string at {offset:#x} missing null terminator")]
    MissingNullTerminator { offset: usize },

    /// Bytes that are not valid Shift-JIS (or UTF-8 for ASCII names).
    #[error("undecodable string at {offset:#x}")]
    InvalidString { offset: usize },

    /// Text that cannot be represented in Shift-JIS.
    #[error("string {text:?} cannot be encoded as Shift-JIS")]
    Unencodable { text: String },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unencodable { .. } => ErrorKind::Validation,
            Self::UnexpectedEof { .. }
            | Self::InvalidMagic { .. }
            | Self::MissingNullTerminator { .. }
            | Self::InvalidString { .. } => ErrorKind::Format,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
