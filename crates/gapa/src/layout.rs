//! File names of the binary and text trees.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Where each file lives inside the binary and text directories.
///
/// The defaults match the file names inside a galaxy's `ParticleData`
/// archive and the tree produced by a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Particle container, binary side.
    pub container: String,
    /// ParticleNames table, binary side.
    pub particle_names: String,
    /// AutoEffectList table, binary side.
    pub effect_list: String,
    /// Particle and texture name lists, text side.
    pub summary: String,
    /// Effect entries, text side.
    pub effects: String,
    /// Directory of per-particle documents, text side.
    pub particles_dir: String,
    /// Directory of textures, text side.
    pub textures_dir: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            container: "Particles.jpc".to_string(),
            particle_names: "ParticleNames.bcsv".to_string(),
            effect_list: "AutoEffectList.bcsv".to_string(),
            summary: "Particles.json".to_string(),
            effects: "Effects.json".to_string(),
            particles_dir: "Particles".to_string(),
            textures_dir: "Textures".to_string(),
        }
    }
}

impl Layout {
    /// Path of a particle document.
    pub fn particle_path(&self, root: &Path, name: &str) -> Result<PathBuf> {
        check_name("particle", name)?;
        Ok(root.join(&self.particles_dir).join(format!("{name}.json")))
    }

    /// Path of a texture.
    pub fn texture_path(&self, root: &Path, name: &str) -> Result<PathBuf> {
        check_name("texture", name)?;
        Ok(root.join(&self.textures_dir).join(format!("{name}.bti")))
    }
}

/// Names become file names, so they must stay a single path component.
fn check_name(what: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', ':', '\0']) {
        return Err(Error::InvalidName {
            what,
            name: name.to_string(),
        });
    }
    Ok(())
}
