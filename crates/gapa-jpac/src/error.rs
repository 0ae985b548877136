//! Error types for particle container parsing and writing.

use gapa_common::ErrorKind;
use thiserror::Error;

use crate::BlockKind;

/// Errors that can occur when parsing or writing particle containers.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] gapa_common::Error),

    /// Block tag that is not four ASCII letters or digits.
    #[error("invalid block tag {tag:02x?} at {offset:#x}")]
    InvalidBlockTag { offset: usize, tag: [u8; 4] },

    /// Block kind name in a particle document that is not a valid tag.
    #[error("invalid block kind {0:?}")]
    InvalidBlockKind(String),

    /// Block whose declared size is smaller than its header.
    #[error("{kind} block at {offset:#x} has invalid size {size}")]
    InvalidBlockSize {
        kind: BlockKind,
        offset: usize,
        size: u32,
    },

    /// Negative block count in a resource header.
    #[error("invalid block count {0}")]
    InvalidBlockCount(i16),

    /// A block that may occur only once was found twice.
    #[error("duplicate {0} block")]
    DuplicateBlock(BlockKind),

    /// Header count disagrees with the blocks actually present.
    #[error("header declares {declared} {what}, found {actual}")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        actual: usize,
    },

    /// Texture chunk whose declared size is smaller than its header.
    #[error("texture at {offset:#x} has invalid size {size}")]
    InvalidTextureSize { offset: usize, size: u32 },

    /// Block payload in a particle document is not valid hex.
    #[error("{block}: invalid hex data: {source}")]
    InvalidHex {
        block: String,
        #[source]
        source: hex::FromHexError,
    },

    /// A required block is missing.
    #[error("missing {0} block")]
    MissingBlock(BlockKind),

    /// A recognised block kind listed among the extra blocks.
    #[error("{0} is a known block kind and cannot be stored as an extra block")]
    ReservedExtraKind(BlockKind),

    /// More entries than the format can count.
    #[error("too many {what}: {count} (maximum {max})")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },

    /// Texture name wider than the fixed name buffer.
    #[error("texture name {name:?} is {length} bytes, maximum is {max}")]
    TextureNameTooLong {
        name: String,
        length: usize,
        max: usize,
    },

    /// Two particles with the same name.
    #[error("duplicate particle {0:?}")]
    DuplicateParticle(String),

    /// Two textures with the same name.
    #[error("duplicate texture {0:?}")]
    DuplicateTexture(String),

    /// Number of particle names does not match the container.
    #[error("container holds {particles} particles but {names} names were given")]
    NameCountMismatch { names: usize, particles: usize },

    /// Texture index outside the container's texture list.
    #[error("texture index {index} out of range (texture count: {count})")]
    TextureIndexOutOfRange { index: i16, count: usize },

    /// Error while reading one particle of a container.
    #[error("particle #{index} {name:?}: {source}")]
    InParticle {
        index: usize,
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// Texture name that is not part of the texture list.
    #[error("unknown texture {0:?}")]
    UnknownTexture(String),

    /// Particle that references a texture missing from the texture list.
    #[error("particle {particle:?} references missing texture {texture:?}")]
    MissingParticleTexture { particle: String, texture: String },

    /// Particle named in an inclusion list but absent from the container.
    #[error("particle {0:?} not found")]
    MissingParticle(String),

    /// Texture named in an inclusion list but absent from the container.
    #[error("texture {0:?} not found")]
    MissingTexture(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Common(e) => e.kind(),
            Self::InParticle { source, .. } => source.kind(),
            Self::InvalidBlockTag { .. }
            | Self::InvalidBlockKind(_)
            | Self::InvalidBlockSize { .. }
            | Self::InvalidBlockCount(_)
            | Self::DuplicateBlock(_)
            | Self::CountMismatch { .. }
            | Self::InvalidTextureSize { .. }
            | Self::InvalidHex { .. } => ErrorKind::Format,
            Self::MissingBlock(_)
            | Self::ReservedExtraKind(_)
            | Self::TooMany { .. }
            | Self::TextureNameTooLong { .. }
            | Self::DuplicateParticle(_)
            | Self::DuplicateTexture(_)
            | Self::NameCountMismatch { .. } => ErrorKind::Validation,
            Self::TextureIndexOutOfRange { .. }
            | Self::UnknownTexture(_)
            | Self::MissingParticleTexture { .. }
            | Self::MissingParticle(_)
            | Self::MissingTexture(_) => ErrorKind::Reference,
        }
    }
}

/// Result type for particle container operations.
pub type Result<T> = std::result::Result<T, Error>;
