//! Mapping between the particle tables and their editable form.
//!
//! Two JMap tables accompany every particle container:
//!
//! - `AutoEffectList` binds particles to actors and animations. Each row
//!   becomes an [`EffectEntry`], with fields equal to their default left
//!   out of the JSON form.
//! - `ParticleNames` assigns a name to every particle in the container by
//!   position.
//!
//! # Example
//!
//! ```no_run
//! use gapa_effects::{entries_from_json, to_table};
//!
//! let entries = entries_from_json(r#"[{"GroupName": "Kuribo", "UniqueName": "Death"}]"#)?;
//! let bytes = to_table(&entries)?.to_bytes()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod entry;
mod error;
pub mod particle_names;
mod table;

pub use entry::{entries_from_json, EffectEntry, DRAW_ORDERS};
pub use error::{Error, Result};
pub use table::{to_entries, to_table, EFFECT_FIELDS};
