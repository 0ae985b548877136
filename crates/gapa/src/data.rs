//! Conversion between the binary files and the editable text tree.
//!
//! Both directions decode and validate everything in memory first; files
//! are only written once every conversion has succeeded, so a failed run
//! leaves the destination untouched.

use std::fs;
use std::io;
use std::path::Path;

use gapa_effects::particle_names::{names_from_table, names_to_table};
use gapa_effects::{entries_from_json, to_entries, to_table, EffectEntry};
use gapa_jmap::JMapInfo;
use gapa_jpac::{JpaResource, JpaTexture, ParticleContainer, ParticleDocument};
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Layout, Result};

/// The particle and texture name lists of a dump, in container order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub particles: Vec<String>,
    pub textures: Vec<String>,
}

/// A galaxy's particle data: the container and its automatic effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleData {
    pub container: ParticleContainer,
    pub effects: Vec<EffectEntry>,
}

/// Encoded contents of the three binary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFiles {
    pub container: Vec<u8>,
    pub particle_names: Vec<u8>,
    pub effect_list: Vec<u8>,
}

/// Encoded contents of the text tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFiles {
    pub summary: Vec<u8>,
    pub effects: Vec<u8>,
    /// Particle documents by particle name.
    pub particles: Vec<(String, Vec<u8>)>,
    /// BTI data by texture name.
    pub textures: Vec<(String, Vec<u8>)>,
}

impl ParticleData {
    /// Decode the three binary files.
    pub fn from_binary(container: &[u8], particle_names: &[u8], effect_list: &[u8]) -> Result<Self> {
        let particle_count = ParticleContainer::read_particle_count(container)?;
        let names = decode_names(particle_names, particle_count)?;
        let container = ParticleContainer::parse(container, &names)?;
        let effects = decode_effects(effect_list)?;

        Ok(Self { container, effects })
    }

    /// Read and decode the binary files in `dir`.
    pub fn from_binary_dir(dir: impl AsRef<Path>, layout: &Layout) -> Result<Self> {
        let dir = dir.as_ref();
        let container_path = dir.join(&layout.container);
        let names_path = dir.join(&layout.particle_names);
        let effects_path = dir.join(&layout.effect_list);

        let container_data = read_file(&container_path)?;
        let particle_count = ParticleContainer::read_particle_count(&container_data)
            .map_err(|e| Error::from(e).in_file(&container_path))?;

        let names = decode_names(&read_file(&names_path)?, particle_count)
            .map_err(|e| e.in_file(&names_path))?;

        let container = ParticleContainer::parse(&container_data, &names)
            .map_err(|e| Error::from(e).in_file(&container_path))?;
        debug!(
            "read {} particles and {} textures from {}",
            names.len(),
            container.textures().len(),
            container_path.display()
        );

        let effects = decode_effects(&read_file(&effects_path)?)
            .map_err(|e| e.in_file(&effects_path))?;

        Ok(Self { container, effects })
    }

    /// Read and validate the text tree in `dir`.
    ///
    /// The summary decides which particles and textures are loaded, and in
    /// which order.
    pub fn from_text_dir(dir: impl AsRef<Path>, layout: &Layout) -> Result<Self> {
        let dir = dir.as_ref();
        let summary_path = dir.join(&layout.summary);
        let summary: Summary = read_json(&summary_path)?;

        let mut container = ParticleContainer::new();

        for name in &summary.textures {
            let path = layout
                .texture_path(dir, name)
                .map_err(|e| e.in_file(&summary_path))?;
            let texture = JpaTexture::new(name.clone(), read_listed("texture", name, &path)?);
            container
                .insert_texture(texture)
                .map_err(|e| Error::from(e).in_file(&summary_path))?;
            debug!("read texture {name}");
        }

        for name in &summary.particles {
            let path = layout
                .particle_path(dir, name)
                .map_err(|e| e.in_file(&summary_path))?;
            let data = read_listed("particle", name, &path)?;
            let document: ParticleDocument =
                serde_json::from_slice(&data).map_err(|e| Error::from(e).in_file(&path))?;
            let resource = JpaResource::try_from(document).map_err(|source| {
                Error::Particle {
                    name: name.clone(),
                    source,
                }
                .in_file(&path)
            })?;
            container
                .insert_particle(name.clone(), resource)
                .map_err(|e| Error::from(e).in_file(&summary_path))?;
            debug!("read particle {name}");
        }

        let effects_path = dir.join(&layout.effects);
        let effects = entries_from_json(&read_text(&effects_path)?)
            .map_err(|e| Error::from(e).in_file(&effects_path))?;

        let data = Self { container, effects };
        data.check()?;
        Ok(data)
    }

    /// Check that every texture a particle uses is in the container.
    ///
    /// Textures no particle uses are only reported.
    pub fn check(&self) -> Result<()> {
        let available: FxHashSet<&str> = self
            .container
            .textures()
            .iter()
            .map(|texture| texture.name.as_str())
            .collect();
        let mut used = FxHashSet::default();

        for (name, resource) in self.container.particles() {
            for texture in &resource.textures {
                if !available.contains(texture.as_str()) {
                    return Err(gapa_jpac::Error::MissingParticleTexture {
                        particle: name.to_string(),
                        texture: texture.clone(),
                    }
                    .into());
                }
                used.insert(texture.as_str());
            }
        }

        let unused: Vec<&str> = self
            .container
            .textures()
            .iter()
            .map(|texture| texture.name.as_str())
            .filter(|name| !used.contains(name))
            .collect();
        if !unused.is_empty() {
            warn!("unused textures: {}", unused.join(", "));
        }

        Ok(())
    }

    /// Encode the three binary files.
    pub fn to_binary(&self) -> Result<BinaryFiles> {
        self.check()?;

        let names = self.container.particle_names();
        let container = self.container.to_bytes(&names, &self.container.texture_names())?;
        let particle_names = names_to_table(&names)?.to_bytes()?;
        let effect_list = to_table(&self.effects)?.to_bytes()?;

        Ok(BinaryFiles {
            container,
            particle_names,
            effect_list,
        })
    }

    /// Encode the text tree.
    pub fn to_text(&self) -> Result<TextFiles> {
        let summary = Summary {
            particles: self.container.particle_names(),
            textures: self.container.texture_names(),
        };

        let particles = self
            .container
            .particles()
            .map(|(name, resource)| Ok((name.to_string(), to_json(&ParticleDocument::from(resource))?)))
            .collect::<Result<Vec<_>>>()?;

        let textures = self
            .container
            .textures()
            .iter()
            .map(|texture| (texture.name.clone(), texture.data.clone()))
            .collect();

        Ok(TextFiles {
            summary: to_json(&summary)?,
            effects: to_json(&self.effects)?,
            particles,
            textures,
        })
    }
}

impl BinaryFiles {
    /// Write the files into `dir`, creating it if needed.
    pub fn write(&self, dir: impl AsRef<Path>, layout: &Layout) -> Result<()> {
        let dir = dir.as_ref();
        write_file(&dir.join(&layout.container), &self.container)?;
        write_file(&dir.join(&layout.particle_names), &self.particle_names)?;
        write_file(&dir.join(&layout.effect_list), &self.effect_list)?;
        Ok(())
    }
}

impl TextFiles {
    /// Write the tree into `dir`, creating directories as needed.
    ///
    /// Every particle and texture name is checked before anything is written.
    pub fn write(&self, dir: impl AsRef<Path>, layout: &Layout) -> Result<()> {
        let dir = dir.as_ref();
        let particles = self
            .particles
            .iter()
            .map(|(name, data)| Ok((layout.particle_path(dir, name)?, data)))
            .collect::<Result<Vec<_>>>()?;
        let textures = self
            .textures
            .iter()
            .map(|(name, data)| Ok((layout.texture_path(dir, name)?, data)))
            .collect::<Result<Vec<_>>>()?;

        write_file(&dir.join(&layout.summary), &self.summary)?;
        write_file(&dir.join(&layout.effects), &self.effects)?;
        for (path, data) in particles.iter().chain(&textures) {
            write_file(path, data)?;
        }

        debug!(
            "wrote {} particles and {} textures to {}",
            self.particles.len(),
            self.textures.len(),
            dir.display()
        );
        Ok(())
    }
}

/// Convert the binary files in `src` into a text tree in `dst`.
pub fn dump(src: impl AsRef<Path>, dst: impl AsRef<Path>, layout: &Layout) -> Result<()> {
    let files = ParticleData::from_binary_dir(src, layout)?.to_text()?;
    files.write(dst, layout)
}

/// Convert the text tree in `src` into binary files in `dst`.
pub fn pack(src: impl AsRef<Path>, dst: impl AsRef<Path>, layout: &Layout) -> Result<()> {
    let files = ParticleData::from_text_dir(src, layout)?.to_binary()?;
    files.write(dst, layout)
}

fn decode_names(data: &[u8], particle_count: usize) -> Result<Vec<String>> {
    let table = JMapInfo::parse(data)?;
    Ok(names_from_table(&table, particle_count)?)
}

fn decode_effects(data: &[u8]) -> Result<Vec<EffectEntry>> {
    let table = JMapInfo::parse(data)?;
    Ok(to_entries(&table)?)
}

/// Pretty JSON with four-space indentation and no trailing newline.
fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    serde_json::from_str(&read_text(path)?).map_err(|e| Error::from(e).in_file(path))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the file of a particle or texture named in the summary.
fn read_listed(what: &'static str, name: &str, path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::MissingFile {
            what,
            name: name.to_string(),
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, data).map_err(io_error)
}
