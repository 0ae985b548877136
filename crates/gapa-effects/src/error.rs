//! Error types for table mapping.

use gapa_common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when mapping particle tables.
#[derive(Debug, Error)]
pub enum Error {
    /// JMap table error.
    #[error("{0}")]
    JMap(#[from] gapa_jmap::Error),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The effect list is not a JSON array of objects.
    #[error("effect list must be an array of objects")]
    NotAnArray,

    /// A required field is absent.
    #[error("record {record}: missing required field {field}")]
    MissingField { record: usize, field: &'static str },

    /// A column has a different type than expected.
    #[error("record {record}: field {field} is not a {expected}")]
    FieldType {
        record: usize,
        field: &'static str,
        expected: &'static str,
    },

    /// A ParticleNames id outside the container.
    #[error("particle {name:?} has id {id}, container holds {count} particles")]
    ParticleIdOutOfRange { name: String, id: i32, count: usize },

    /// Two names for the same container position.
    #[error("particle id {id} is named both {first:?} and {second:?}")]
    DuplicateParticleId {
        id: usize,
        first: String,
        second: String,
    },

    /// A container position without a name.
    #[error("particle id {0} has no name")]
    UnnamedParticle(usize),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::JMap(e) => e.kind(),
            Self::Json(_) | Self::NotAnArray | Self::FieldType { .. } => ErrorKind::Format,
            Self::MissingField { .. }
            | Self::DuplicateParticleId { .. }
            | Self::UnnamedParticle(_) => ErrorKind::Validation,
            Self::ParticleIdOutOfRange { .. } => ErrorKind::Reference,
        }
    }
}

/// Result type for table mapping operations.
pub type Result<T> = std::result::Result<T, Error>;
