//! Error types for dumping and packing particle data.

use std::path::PathBuf;

use gapa_common::ErrorKind;
use thiserror::Error;

/// Errors that can occur while dumping or packing particle data.
#[derive(Debug, Error)]
pub enum Error {
    /// JMap table error.
    #[error("{0}")]
    JMap(#[from] gapa_jmap::Error),

    /// Particle container error.
    #[error("{0}")]
    Jpac(#[from] gapa_jpac::Error),

    /// Table mapping error.
    #[error("{0}")]
    Effects(#[from] gapa_effects::Error),

    /// Error in a single particle.
    #[error("particle {name:?}: {source}")]
    Particle {
        name: String,
        #[source]
        source: gapa_jpac::Error,
    },

    /// Error in one of the binary or text files.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Particle or texture name that cannot be used as a file name.
    #[error("invalid {what} name {name:?}")]
    InvalidName { what: &'static str, name: String },

    /// File of a listed particle or texture does not exist.
    #[error("{what} {name:?} is listed but {} does not exist", path.display())]
    MissingFile {
        what: &'static str,
        name: String,
        path: PathBuf,
    },

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::JMap(e) => e.kind(),
            Self::Jpac(e) | Self::Particle { source: e, .. } => e.kind(),
            Self::Effects(e) => e.kind(),
            Self::File { source, .. } => source.kind(),
            Self::InvalidName { .. } => ErrorKind::Validation,
            Self::MissingFile { .. } => ErrorKind::Reference,
            Self::Json(_) => ErrorKind::Format,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Attach the path of the file being processed.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for dump and pack operations.
pub type Result<T> = std::result::Result<T, Error>;
