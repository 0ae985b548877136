//! JPAC2-10 particle container codec.
//!
//! Super Mario Galaxy stores all particle effects of the game in a single
//! `Particles.jpc` container. The container holds a list of JPA resources
//! (one per particle effect, each made of tagged blocks) followed by the
//! BTI textures those resources reference.
//!
//! # File Format
//!
//! All values are big-endian:
//! - 16 bytes: `JPAC2-10` magic, particle count, texture count, texture section offset
//! - Particle resources, back to back
//! - Zero padding to a 32-byte boundary
//! - Textures, each a `TEX1` chunk padded to 32 bytes
//!
//! Particles have no names inside the container; those come from the
//! separate ParticleNames table and are passed in by the caller.
//!
//! # Example
//!
//! ```no_run
//! use gapa_jpac::ParticleContainer;
//!
//! let data = std::fs::read("Particles.jpc")?;
//! let names: Vec<String> = (0..2).map(|i| format!("Particle{i}")).collect();
//! let container = ParticleContainer::parse(&data, &names)?;
//!
//! let bytes = container.to_bytes(&container.particle_names(), &container.texture_names())?;
//! assert_eq!(bytes, data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod block;
mod container;
mod document;
mod error;
mod header;
mod resource;
mod texture;

pub use block::{Block, BlockKind, OpaqueBlock};
pub use container::ParticleContainer;
pub use document::{ExtraBlockDocument, ParticleDocument};
pub use error::{Error, Result};
pub use header::{BlockHeader, JpacHeader, ResourceHeader, TextureHeader};
pub use resource::JpaResource;
pub use texture::JpaTexture;
