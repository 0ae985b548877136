//! On-disk header structures of the particle container.

use gapa_common::be::{I16, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Container file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct JpacHeader {
    /// Magic bytes, `JPAC2-10`.
    pub magic: [u8; 8],
    /// Number of particle resources.
    pub particle_count: U16,
    /// Number of textures.
    pub texture_count: U16,
    /// Offset of the first texture.
    pub texture_offset: U32,
}

impl JpacHeader {
    /// Expected magic bytes.
    pub const MAGIC: &'static [u8; 8] = b"JPAC2-10";

    /// Size of the header in bytes.
    pub const SIZE: usize = 0x10;

    /// Alignment of the texture section.
    pub const TEXTURE_ALIGNMENT: usize = 32;
}

/// Header of a single JPA resource.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ResourceHeader {
    /// Position of the resource in the container.
    pub index: I16,
    /// Number of blocks following the header.
    pub block_count: I16,
    /// Number of `FLD1` blocks.
    pub field_block_count: u8,
    /// Number of `KFA1` blocks.
    pub key_block_count: u8,
    /// Number of entries in the `TDB1` block.
    pub texture_count: u8,
    /// Always zero.
    pub padding: u8,
}

impl ResourceHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 8;
}

/// Header preceding every block of a resource.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct BlockHeader {
    /// Four-character block tag.
    pub tag: [u8; 4],
    /// Size of the block including this header.
    pub size: U32,
}

impl BlockHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 8;
}

/// Header of a `TEX1` texture chunk.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct TextureHeader {
    /// Magic bytes, `TEX1`.
    pub magic: [u8; 4],
    /// Size of the chunk including this header.
    pub total_size: U32,
    /// Always zero.
    pub reserved: U32,
    /// NUL-padded texture file name.
    pub name: [u8; 0x14],
}

impl TextureHeader {
    /// Expected magic bytes.
    pub const MAGIC: &'static [u8; 4] = b"TEX1";

    /// Size of the header in bytes.
    pub const SIZE: usize = 0x20;

    /// Capacity of the name buffer.
    pub const NAME_SIZE: usize = 0x14;

    /// Alignment of a whole texture chunk.
    pub const ALIGNMENT: usize = 32;
}
