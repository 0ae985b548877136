//! Gapa - Super Mario Galaxy particle data library.
//!
//! This crate ties the format crates together and converts a galaxy's
//! particle data between the game's binary files and an editable tree of
//! JSON documents and BTI textures.
//!
//! # Crates
//!
//! - [`gapa_common`] - Common utilities (binary reading/writing, Shift-JIS)
//! - [`gapa_jmap`] - JMap (`.bcsv`) tables
//! - [`gapa_jpac`] - `JPAC2-10` particle containers (`.jpc`)
//! - [`gapa_effects`] - AutoEffectList and ParticleNames mapping
//!
//! # Example
//!
//! ```no_run
//! use gapa::prelude::*;
//!
//! // Binary files to an editable tree...
//! gapa::dump("ParticleData", "ParticleDump", &Layout::default())?;
//!
//! // ...and back.
//! gapa::pack("ParticleDump", "ParticleData", &Layout::default())?;
//! # Ok::<(), gapa::Error>(())
//! ```

mod data;
mod error;
mod layout;

// Re-export all sub-crates
pub use gapa_common as common;
pub use gapa_effects as effects;
pub use gapa_jmap as jmap;
pub use gapa_jpac as jpac;

pub use data::{dump, pack, BinaryFiles, ParticleData, Summary, TextFiles};
pub use error::{Error, Result};
pub use layout::Layout;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{BinaryFiles, Layout, ParticleData, TextFiles};
    pub use gapa_common::{BinaryReader, ErrorKind};
    pub use gapa_effects::{EffectEntry, DRAW_ORDERS};
    pub use gapa_jmap::{FieldType, JMapInfo, Value};
    pub use gapa_jpac::{JpaResource, JpaTexture, ParticleContainer, ParticleDocument};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
