//! Tagged blocks inside a JPA resource.

use gapa_common::{align_up, BinaryReader, BinaryWriter};

use crate::header::BlockHeader;
use crate::{Error, Result};

/// Payload alignment of every block.
const BLOCK_ALIGNMENT: usize = 4;

/// Kind of a block, derived from its four-character tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `BEM1`: emitter dynamics.
    Dynamics,
    /// `FLD1`: field (force) block.
    Field,
    /// `KFA1`: key frame animation block.
    Key,
    /// `BSP1`: base shape.
    BaseShape,
    /// `ESP1`: extra shape.
    ExtraShape,
    /// `SSP1`: child shape.
    ChildShape,
    /// `ETX1`: ex-tex shape.
    ExTexShape,
    /// `TDB1`: texture database.
    TextureDatabase,
    /// Any other tag.
    Other([u8; 4]),
}

impl BlockKind {
    /// Resolve a tag.
    pub fn from_tag(tag: [u8; 4]) -> Self {
        match &tag {
            b"BEM1" => Self::Dynamics,
            b"FLD1" => Self::Field,
            b"KFA1" => Self::Key,
            b"BSP1" => Self::BaseShape,
            b"ESP1" => Self::ExtraShape,
            b"SSP1" => Self::ChildShape,
            b"ETX1" => Self::ExTexShape,
            b"TDB1" => Self::TextureDatabase,
            _ => Self::Other(tag),
        }
    }

    /// Parse a tag written as text, e.g. `"XYZ1"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let tag: [u8; 4] = name.as_bytes().try_into().ok()?;
        is_valid_tag(&tag).then(|| Self::from_tag(tag))
    }

    /// The four-character tag.
    pub fn tag(self) -> [u8; 4] {
        match self {
            Self::Dynamics => *b"BEM1",
            Self::Field => *b"FLD1",
            Self::Key => *b"KFA1",
            Self::BaseShape => *b"BSP1",
            Self::ExtraShape => *b"ESP1",
            Self::ChildShape => *b"SSP1",
            Self::ExTexShape => *b"ETX1",
            Self::TextureDatabase => *b"TDB1",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this is one of the recognised block kinds.
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.tag()))
    }
}

fn is_valid_tag(tag: &[u8; 4]) -> bool {
    tag.iter().all(u8::is_ascii_alphanumeric)
}

/// A block whose payload is kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueBlock {
    /// Block kind.
    pub kind: BlockKind,
    /// Payload, including any trailing alignment bytes read from the file.
    pub data: Vec<u8>,
}

impl OpaqueBlock {
    /// Create a block.
    pub fn new(kind: BlockKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }
}

/// A single block of a JPA resource.
///
/// Only the texture database is interpreted; every other block is carried
/// through byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Uninterpreted block.
    Opaque(OpaqueBlock),
    /// `TDB1`: indices into the container's texture list.
    TextureDatabase(Vec<i16>),
}

impl Block {
    /// Read a block at the reader's position.
    ///
    /// `texture_count` comes from the resource header and gives the number
    /// of indices stored in a texture database.
    pub fn read(reader: &mut BinaryReader<'_>, texture_count: usize) -> Result<Self> {
        let offset = reader.position();
        let header: BlockHeader = reader.read_struct()?;

        if !is_valid_tag(&header.tag) {
            return Err(Error::InvalidBlockTag {
                offset,
                tag: header.tag,
            });
        }

        let kind = BlockKind::from_tag(header.tag);
        let size = header.size.get();
        let payload_size = (size as usize)
            .checked_sub(BlockHeader::SIZE)
            .ok_or(Error::InvalidBlockSize { kind, offset, size })?;
        let payload = reader.read_bytes(payload_size)?;

        if kind == BlockKind::TextureDatabase {
            let mut payload_reader = BinaryReader::new(payload);
            let indices = (0..texture_count)
                .map(|_| payload_reader.read_i16())
                .collect::<gapa_common::Result<Vec<_>>>()
                .map_err(|_| Error::CountMismatch {
                    what: "texture indices",
                    declared: texture_count,
                    actual: payload.len() / 2,
                })?;
            return Ok(Self::TextureDatabase(indices));
        }

        Ok(Self::Opaque(OpaqueBlock::new(kind, payload.to_vec())))
    }

    /// Kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Opaque(block) => block.kind,
            Self::TextureDatabase(_) => BlockKind::TextureDatabase,
        }
    }

    /// Append this block, padding its payload to 4 bytes.
    pub fn write(&self, writer: &mut BinaryWriter) {
        let payload_size = match self {
            Self::Opaque(block) => block.data.len(),
            Self::TextureDatabase(indices) => indices.len() * 2,
        };

        writer.put_struct(&BlockHeader {
            tag: self.kind().tag(),
            size: ((BlockHeader::SIZE + align_up(payload_size, BLOCK_ALIGNMENT)) as u32).into(),
        });

        match self {
            Self::Opaque(block) => writer.put_bytes(&block.data),
            Self::TextureDatabase(indices) => {
                for &index in indices {
                    writer.put_i16(index);
                }
            }
        }

        writer.align(BLOCK_ALIGNMENT, 0);
    }
}
