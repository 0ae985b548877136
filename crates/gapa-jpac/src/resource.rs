//! JPA resources: the per-particle block collections.

use gapa_common::{BinaryReader, BinaryWriter};

use crate::header::ResourceHeader;
use crate::{Block, BlockKind, Error, OpaqueBlock, Result};

/// A particle effect resource.
///
/// Block payloads are opaque. Textures are referenced by name; the
/// numeric indices stored in the file are resolved on read and recomputed
/// on write against the container's texture list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpaResource {
    /// `BEM1` payload.
    pub dynamics: Vec<u8>,
    /// `FLD1` payloads, in file order.
    pub field_blocks: Vec<Vec<u8>>,
    /// `KFA1` payloads, in file order.
    pub key_blocks: Vec<Vec<u8>>,
    /// `BSP1` payload.
    pub base_shape: Vec<u8>,
    /// `ESP1` payload.
    pub extra_shape: Vec<u8>,
    /// `SSP1` payload, if present.
    pub child_shape: Option<Vec<u8>>,
    /// `ETX1` payload, if present.
    pub ex_tex_shape: Option<Vec<u8>>,
    /// Blocks with unrecognised tags, in file order.
    pub extra_blocks: Vec<OpaqueBlock>,
    /// Names of the textures used by this particle.
    pub textures: Vec<String>,
}

/// Blocks collected while reading, before required blocks are checked.
#[derive(Default)]
struct PartialResource {
    dynamics: Option<Vec<u8>>,
    field_blocks: Vec<Vec<u8>>,
    key_blocks: Vec<Vec<u8>>,
    base_shape: Option<Vec<u8>>,
    extra_shape: Option<Vec<u8>>,
    child_shape: Option<Vec<u8>>,
    ex_tex_shape: Option<Vec<u8>>,
    extra_blocks: Vec<OpaqueBlock>,
    texture_indices: Option<Vec<i16>>,
}

impl PartialResource {
    fn add(&mut self, block: Block) -> Result<()> {
        let kind = block.kind();
        match block {
            Block::TextureDatabase(indices) => set_once(&mut self.texture_indices, indices, kind),
            Block::Opaque(OpaqueBlock { kind, data }) => match kind {
                BlockKind::Dynamics => set_once(&mut self.dynamics, data, kind),
                BlockKind::Field => {
                    self.field_blocks.push(data);
                    Ok(())
                }
                BlockKind::Key => {
                    self.key_blocks.push(data);
                    Ok(())
                }
                BlockKind::BaseShape => set_once(&mut self.base_shape, data, kind),
                BlockKind::ExtraShape => set_once(&mut self.extra_shape, data, kind),
                BlockKind::ChildShape => set_once(&mut self.child_shape, data, kind),
                BlockKind::ExTexShape => set_once(&mut self.ex_tex_shape, data, kind),
                BlockKind::TextureDatabase | BlockKind::Other(_) => {
                    self.extra_blocks.push(OpaqueBlock::new(kind, data));
                    Ok(())
                }
            },
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, kind: BlockKind) -> Result<()> {
    if slot.is_some() {
        return Err(Error::DuplicateBlock(kind));
    }
    *slot = Some(value);
    Ok(())
}

impl JpaResource {
    /// Parse a resource from the start of `data`.
    ///
    /// `texture_names` is the container's texture list, used to resolve
    /// texture indices. Returns the resource and the number of bytes read.
    pub fn parse(data: &[u8], texture_names: &[String]) -> Result<(Self, usize)> {
        let mut reader = BinaryReader::new(data);
        let resource = Self::read(&mut reader, texture_names)?;
        Ok((resource, reader.position()))
    }

    /// Read a resource at the reader's position.
    ///
    /// Offsets in errors are positions in the reader's buffer.
    pub fn read(reader: &mut BinaryReader<'_>, texture_names: &[String]) -> Result<Self> {
        let header: ResourceHeader = reader.read_struct()?;

        let block_count = header.block_count.get();
        if block_count < 0 {
            return Err(Error::InvalidBlockCount(block_count));
        }

        let texture_count = header.texture_count as usize;
        let mut partial = PartialResource::default();
        for _ in 0..block_count {
            partial.add(Block::read(reader, texture_count)?)?;
        }

        check_count("field blocks", header.field_block_count, partial.field_blocks.len())?;
        check_count("key blocks", header.key_block_count, partial.key_blocks.len())?;

        let texture_indices = partial.texture_indices.unwrap_or_default();
        check_count("textures", header.texture_count, texture_indices.len())?;

        let textures = texture_indices
            .iter()
            .map(|&index| {
                usize::try_from(index)
                    .ok()
                    .and_then(|i| texture_names.get(i))
                    .cloned()
                    .ok_or(Error::TextureIndexOutOfRange {
                        index,
                        count: texture_names.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dynamics: partial
                .dynamics
                .ok_or(Error::MissingBlock(BlockKind::Dynamics))?,
            field_blocks: partial.field_blocks,
            key_blocks: partial.key_blocks,
            base_shape: partial
                .base_shape
                .ok_or(Error::MissingBlock(BlockKind::BaseShape))?,
            extra_shape: partial
                .extra_shape
                .ok_or(Error::MissingBlock(BlockKind::ExtraShape))?,
            child_shape: partial.child_shape,
            ex_tex_shape: partial.ex_tex_shape,
            extra_blocks: partial.extra_blocks,
            textures,
        })
    }

    /// Resolve this resource's texture names to indices into `texture_names`.
    pub fn texture_indices(&self, texture_names: &[String]) -> Result<Vec<i16>> {
        self.textures
            .iter()
            .map(|name| {
                texture_names
                    .iter()
                    .position(|candidate| candidate == name)
                    .and_then(|index| i16::try_from(index).ok())
                    .ok_or_else(|| Error::UnknownTexture(name.clone()))
            })
            .collect()
    }

    /// The blocks of this resource in the order they are written.
    pub fn blocks(&self, texture_names: &[String]) -> Result<Vec<Block>> {
        for extra in &self.extra_blocks {
            if extra.kind.is_known() {
                return Err(Error::ReservedExtraKind(extra.kind));
            }
        }

        let opaque = |kind, data: &Vec<u8>| Block::Opaque(OpaqueBlock::new(kind, data.clone()));

        let mut blocks = vec![opaque(BlockKind::Dynamics, &self.dynamics)];
        blocks.extend(self.field_blocks.iter().map(|data| opaque(BlockKind::Field, data)));
        blocks.extend(self.key_blocks.iter().map(|data| opaque(BlockKind::Key, data)));
        blocks.push(opaque(BlockKind::BaseShape, &self.base_shape));
        blocks.push(opaque(BlockKind::ExtraShape, &self.extra_shape));
        if let Some(data) = &self.child_shape {
            blocks.push(opaque(BlockKind::ChildShape, data));
        }
        if let Some(data) = &self.ex_tex_shape {
            blocks.push(opaque(BlockKind::ExTexShape, data));
        }
        blocks.extend(self.extra_blocks.iter().cloned().map(Block::Opaque));
        blocks.push(Block::TextureDatabase(self.texture_indices(texture_names)?));

        Ok(blocks)
    }

    /// Serialize the resource with `index` as its container position.
    pub fn to_bytes(&self, index: i16, texture_names: &[String]) -> Result<Vec<u8>> {
        let blocks = self.blocks(texture_names)?;

        let header = ResourceHeader {
            index: index.into(),
            block_count: count_i16("blocks", blocks.len())?.into(),
            field_block_count: count_u8("field blocks", self.field_blocks.len())?,
            key_block_count: count_u8("key blocks", self.key_blocks.len())?,
            texture_count: count_u8("textures", self.textures.len())?,
            padding: 0,
        };

        let mut writer = BinaryWriter::new();
        writer.put_struct(&header);
        for block in &blocks {
            block.write(&mut writer);
        }

        Ok(writer.into_inner())
    }
}

fn check_count(what: &'static str, declared: u8, actual: usize) -> Result<()> {
    if declared as usize != actual {
        return Err(Error::CountMismatch {
            what,
            declared: declared as usize,
            actual,
        });
    }
    Ok(())
}

fn count_u8(what: &'static str, count: usize) -> Result<u8> {
    u8::try_from(count).map_err(|_| Error::TooMany {
        what,
        count,
        max: u8::MAX as usize,
    })
}

fn count_i16(what: &'static str, count: usize) -> Result<i16> {
    i16::try_from(count).map_err(|_| Error::TooMany {
        what,
        count,
        max: i16::MAX as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapa_common::be::I16;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> JpaResource {
        JpaResource {
            dynamics: vec![0x11; 8],
            field_blocks: vec![vec![0x22; 4], vec![0x23; 4]],
            key_blocks: vec![vec![0x33; 12]],
            base_shape: vec![0x44; 4],
            extra_shape: vec![0x55; 8],
            child_shape: Some(vec![0x66; 4]),
            ex_tex_shape: None,
            extra_blocks: vec![],
            textures: names(&["b", "a"]),
        }
    }

    #[test]
    fn test_roundtrip() {
        let textures = names(&["a", "b", "c"]);
        let resource = sample();

        let bytes = resource.to_bytes(3, &textures).unwrap();
        let (parsed, consumed) = JpaResource::parse(&bytes, &textures).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed, resource);
        assert_eq!(parsed.to_bytes(3, &textures).unwrap(), bytes);
    }

    #[test]
    fn test_header_and_block_order() {
        let textures = names(&["a", "b"]);
        let bytes = sample().to_bytes(7, &textures).unwrap();

        // index 7, 8 blocks, 2 field blocks, 1 key block, 2 textures
        assert_eq!(&bytes[..8], &[0, 7, 0, 8, 2, 1, 2, 0]);

        let mut reader = BinaryReader::new_at(&bytes, ResourceHeader::SIZE);
        let kinds: Vec<BlockKind> = (0..8)
            .map(|_| Block::read(&mut reader, 2).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Dynamics,
                BlockKind::Field,
                BlockKind::Field,
                BlockKind::Key,
                BlockKind::BaseShape,
                BlockKind::ExtraShape,
                BlockKind::ChildShape,
                BlockKind::TextureDatabase,
            ]
        );

        // "b" is index 1, "a" is index 0
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 1, 0, 0]);
    }

    #[test]
    fn test_unknown_blocks_are_preserved() {
        let textures = names(&["a", "b"]);
        let mut resource = sample();
        resource.extra_blocks.push(OpaqueBlock::new(BlockKind::Other(*b"XYZ1"), vec![9; 4]));

        let bytes = resource.to_bytes(0, &textures).unwrap();
        let (parsed, _) = JpaResource::parse(&bytes, &textures).unwrap();
        assert_eq!(parsed.extra_blocks, resource.extra_blocks);
    }

    #[test]
    fn test_unknown_blocks_move_after_known_blocks() {
        let mut writer = BinaryWriter::new();
        writer.put_struct(&ResourceHeader {
            index: I16::new(0),
            block_count: I16::new(5),
            field_block_count: 0,
            key_block_count: 0,
            texture_count: 0,
            padding: 0,
        });
        Block::Opaque(OpaqueBlock::new(BlockKind::Other(*b"XYZ1"), vec![9; 4])).write(&mut writer);
        Block::Opaque(OpaqueBlock::new(BlockKind::Dynamics, vec![1; 4])).write(&mut writer);
        Block::Opaque(OpaqueBlock::new(BlockKind::BaseShape, vec![2; 4])).write(&mut writer);
        Block::Opaque(OpaqueBlock::new(BlockKind::ExtraShape, vec![3; 4])).write(&mut writer);
        Block::TextureDatabase(vec![]).write(&mut writer);

        let (resource, _) = JpaResource::parse(&writer.into_inner(), &[]).unwrap();
        let bytes = resource.to_bytes(0, &[]).unwrap();

        let mut reader = BinaryReader::new_at(&bytes, ResourceHeader::SIZE);
        let kinds: Vec<BlockKind> = (0..5)
            .map(|_| Block::read(&mut reader, 0).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Dynamics,
                BlockKind::BaseShape,
                BlockKind::ExtraShape,
                BlockKind::Other(*b"XYZ1"),
                BlockKind::TextureDatabase,
            ]
        );
    }

    #[test]
    fn test_reserved_extra_kind() {
        let mut resource = sample();
        resource.extra_blocks.push(OpaqueBlock::new(BlockKind::BaseShape, vec![]));
        assert!(matches!(
            resource.to_bytes(0, &names(&["a", "b"])),
            Err(Error::ReservedExtraKind(BlockKind::BaseShape))
        ));
    }

    #[test]
    fn test_unknown_texture_name() {
        let err = sample().to_bytes(0, &names(&["a"])).unwrap_err();
        assert!(matches!(&err, Error::UnknownTexture(name) if name == "b"));
        assert_eq!(err.kind(), gapa_common::ErrorKind::Reference);
    }

    #[test]
    fn test_texture_index_out_of_range() {
        let bytes = sample().to_bytes(0, &names(&["a", "b"])).unwrap();
        let err = JpaResource::parse(&bytes, &names(&["a"])).unwrap_err();
        assert!(matches!(err, Error::TextureIndexOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn test_missing_required_block() {
        let mut writer = BinaryWriter::new();
        writer.put_struct(&ResourceHeader {
            index: I16::new(0),
            block_count: I16::new(2),
            field_block_count: 0,
            key_block_count: 0,
            texture_count: 0,
            padding: 0,
        });
        Block::Opaque(OpaqueBlock::new(BlockKind::Dynamics, vec![0; 4])).write(&mut writer);
        Block::Opaque(OpaqueBlock::new(BlockKind::BaseShape, vec![0; 4])).write(&mut writer);

        let err = JpaResource::parse(&writer.into_inner(), &[]).unwrap_err();
        assert!(matches!(err, Error::MissingBlock(BlockKind::ExtraShape)));
        assert_eq!(err.kind(), gapa_common::ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_singleton_block() {
        let mut writer = BinaryWriter::new();
        writer.put_struct(&ResourceHeader {
            index: I16::new(0),
            block_count: I16::new(2),
            field_block_count: 0,
            key_block_count: 0,
            texture_count: 0,
            padding: 0,
        });
        Block::Opaque(OpaqueBlock::new(BlockKind::Dynamics, vec![0; 4])).write(&mut writer);
        Block::Opaque(OpaqueBlock::new(BlockKind::Dynamics, vec![0; 4])).write(&mut writer);

        let err = JpaResource::parse(&writer.into_inner(), &[]).unwrap_err();
        assert!(matches!(err, Error::DuplicateBlock(BlockKind::Dynamics)));
        assert_eq!(err.kind(), gapa_common::ErrorKind::Format);
    }

    #[test]
    fn test_field_block_count_mismatch() {
        let textures = names(&["a", "b"]);
        let mut bytes = sample().to_bytes(0, &textures).unwrap();
        bytes[4] = 3;

        assert!(matches!(
            JpaResource::parse(&bytes, &textures),
            Err(Error::CountMismatch { what: "field blocks", declared: 3, actual: 2 })
        ));
    }
}
