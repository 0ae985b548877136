//! `TEX1` texture chunks.

use gapa_common::be::U32;
use gapa_common::{align_up, sjis, BinaryReader, BinaryWriter};

use crate::header::TextureHeader;
use crate::{Error, Result};

/// A named BTI texture stored in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpaTexture {
    /// Texture file name, without extension.
    pub name: String,
    /// BTI image data, including any trailing alignment bytes read from the file.
    pub data: Vec<u8>,
}

impl JpaTexture {
    /// Create a texture.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read a texture chunk at the reader's position.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let offset = reader.position();
        reader.expect_magic(TextureHeader::MAGIC)?;
        reader.seek(offset);

        let header: TextureHeader = reader.read_struct()?;
        let size = header.total_size.get();
        let data_size = (size as usize)
            .checked_sub(TextureHeader::SIZE)
            .ok_or(Error::InvalidTextureSize { offset, size })?;

        let name_len = header
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TextureHeader::NAME_SIZE);
        let name = sjis::decode(&header.name[..name_len], offset + 0xC)?;
        let data = reader.read_bytes(data_size)?.to_vec();

        Ok(Self { name, data })
    }

    /// Encoded name, checked against the fixed name buffer.
    pub(crate) fn encoded_name(&self) -> Result<[u8; TextureHeader::NAME_SIZE]> {
        let bytes = sjis::encode(&self.name)?;
        if bytes.len() > TextureHeader::NAME_SIZE {
            return Err(Error::TextureNameTooLong {
                name: self.name.clone(),
                length: bytes.len(),
                max: TextureHeader::NAME_SIZE,
            });
        }

        let mut name = [0u8; TextureHeader::NAME_SIZE];
        name[..bytes.len()].copy_from_slice(&bytes);
        Ok(name)
    }

    /// Append this texture as a `TEX1` chunk padded to 32 bytes.
    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        let total_size = TextureHeader::SIZE + align_up(self.data.len(), TextureHeader::ALIGNMENT);

        writer.put_struct(&TextureHeader {
            magic: *TextureHeader::MAGIC,
            total_size: (total_size as u32).into(),
            reserved: U32::new(0),
            name: self.encoded_name()?,
        });
        writer.put_bytes(&self.data);
        writer.align(TextureHeader::ALIGNMENT, 0);

        Ok(())
    }
}
