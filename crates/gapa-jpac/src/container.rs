//! The `JPAC2-10` particle container.

use gapa_common::be::U32;
use gapa_common::{BinaryReader, BinaryWriter};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::header::{JpacHeader, TextureHeader};
use crate::{Error, JpaResource, JpaTexture, Result};

/// A particle container.
///
/// Particles and textures are both kept in container order and looked up
/// by name. Names are unique within each set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticleContainer {
    particles: Vec<(String, JpaResource)>,
    textures: Vec<JpaTexture>,
}

impl ParticleContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a container.
    ///
    /// `names` gives the name of every particle by container position.
    pub fn parse(data: &[u8], names: &[String]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let header = read_header(&mut reader)?;
        let particle_count = header.particle_count.get() as usize;
        let texture_count = header.texture_count.get() as usize;

        if names.len() != particle_count {
            return Err(Error::NameCountMismatch {
                names: names.len(),
                particles: particle_count,
            });
        }

        let mut container = Self::new();

        // Textures come after the particles in the file, but particles
        // need the texture names to resolve their indices.
        reader.seek(header.texture_offset.get() as usize);
        for _ in 0..texture_count {
            container.insert_texture(JpaTexture::read(&mut reader)?)?;
        }

        let texture_names = container.texture_names();
        reader.seek(JpacHeader::SIZE);
        for (index, name) in names.iter().enumerate() {
            let offset = reader.position();
            let resource =
                JpaResource::read(&mut reader, &texture_names).map_err(|source| Error::InParticle {
                    index,
                    name: name.clone(),
                    source: Box::new(source),
                })?;
            debug!("read particle {name} ({} bytes at {offset:#x})", reader.position() - offset);
            container.insert_particle(name.clone(), resource)?;
        }

        Ok(container)
    }

    /// Number of particles declared in a container's header.
    ///
    /// Used to resolve particle names before the container itself is parsed.
    pub fn read_particle_count(data: &[u8]) -> Result<usize> {
        let header = read_header(&mut BinaryReader::new(data))?;
        Ok(header.particle_count.get() as usize)
    }

    /// Serialize the container.
    ///
    /// Only the particles and textures named in the two lists are written,
    /// in list order. Every name must exist in the container and every
    /// texture used by a written particle must be in `texture_order`.
    pub fn to_bytes(&self, particle_order: &[String], texture_order: &[String]) -> Result<Vec<u8>> {
        check_unique(particle_order, Error::DuplicateParticle)?;
        check_unique(texture_order, Error::DuplicateTexture)?;

        let particles = particle_order
            .iter()
            .map(|name| {
                self.particle(name)
                    .map(|resource| (name, resource))
                    .ok_or_else(|| Error::MissingParticle(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let textures = texture_order
            .iter()
            .map(|name| {
                self.texture(name)
                    .ok_or_else(|| Error::MissingTexture(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        for (name, resource) in &particles {
            if let Some(texture) = resource
                .textures
                .iter()
                .find(|texture| !texture_order.contains(texture))
            {
                return Err(Error::MissingParticleTexture {
                    particle: name.to_string(),
                    texture: texture.clone(),
                });
            }
        }
        for texture in &textures {
            texture.encoded_name()?;
        }

        // Resource indices are signed 16-bit.
        let particle_count = check_count("particles", particles.len(), i16::MAX as usize)?;
        let texture_count = check_count("textures", textures.len(), u16::MAX as usize)?;

        let mut writer = BinaryWriter::new();
        writer.put_struct(&JpacHeader {
            magic: *JpacHeader::MAGIC,
            particle_count: particle_count.into(),
            texture_count: texture_count.into(),
            texture_offset: U32::new(0),
        });

        for (index, (_, resource)) in particles.iter().enumerate() {
            writer.put_bytes(&resource.to_bytes(index as i16, texture_order)?);
        }

        writer.align(JpacHeader::TEXTURE_ALIGNMENT, 0);
        let texture_offset = writer.position() as u32;
        writer.patch_u32(0xC, texture_offset);

        for texture in textures {
            texture.write(&mut writer)?;
        }

        debug_assert_eq!(writer.position() % TextureHeader::ALIGNMENT, 0);
        Ok(writer.into_inner())
    }

    /// Serialize every particle and texture in container order.
    pub fn to_bytes_all(&self) -> Result<Vec<u8>> {
        self.to_bytes(&self.particle_names(), &self.texture_names())
    }

    /// Add a particle at the end.
    pub fn insert_particle(&mut self, name: impl Into<String>, resource: JpaResource) -> Result<()> {
        let name = name.into();
        if self.particle(&name).is_some() {
            return Err(Error::DuplicateParticle(name));
        }
        self.particles.push((name, resource));
        Ok(())
    }

    /// Add a texture at the end.
    pub fn insert_texture(&mut self, texture: JpaTexture) -> Result<()> {
        if self.texture(&texture.name).is_some() {
            return Err(Error::DuplicateTexture(texture.name));
        }
        self.textures.push(texture);
        Ok(())
    }

    /// Look up a particle by name.
    pub fn particle(&self, name: &str) -> Option<&JpaResource> {
        self.particles
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, resource)| resource)
    }

    /// Look up a texture by name.
    pub fn texture(&self, name: &str) -> Option<&JpaTexture> {
        self.textures.iter().find(|texture| texture.name == name)
    }

    /// Particles with their names, in container order.
    pub fn particles(&self) -> impl Iterator<Item = (&str, &JpaResource)> {
        self.particles
            .iter()
            .map(|(name, resource)| (name.as_str(), resource))
    }

    /// Textures in container order.
    pub fn textures(&self) -> &[JpaTexture] {
        &self.textures
    }

    /// Particle names in container order.
    pub fn particle_names(&self) -> Vec<String> {
        self.particles.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Texture names in container order.
    pub fn texture_names(&self) -> Vec<String> {
        self.textures.iter().map(|texture| texture.name.clone()).collect()
    }
}

fn read_header(reader: &mut BinaryReader<'_>) -> Result<JpacHeader> {
    reader.expect_magic(JpacHeader::MAGIC)?;
    reader.seek(0);
    Ok(reader.read_struct()?)
}

fn check_unique(names: &[String], error: fn(String) -> Error) -> Result<()> {
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(error(name.clone()));
        }
    }
    Ok(())
}

fn check_count(what: &'static str, count: usize, max: usize) -> Result<u16> {
    if count > max {
        return Err(Error::TooMany { what, count, max });
    }
    Ok(count as u16)
}
