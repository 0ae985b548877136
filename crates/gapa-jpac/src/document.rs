//! Editable JSON form of a particle resource.

use serde::{Deserialize, Serialize};

use crate::{BlockKind, Error, JpaResource, OpaqueBlock, Result};

/// A block with an unrecognised tag, as stored in a particle document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraBlockDocument {
    /// Four-character block tag.
    pub kind: String,
    /// Hex-encoded payload.
    pub data: String,
}

/// The JSON document written for every particle.
///
/// Block payloads are lowercase hex strings. Required blocks are optional
/// here so that a missing block is reported as a validation error instead
/// of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamics_block: Option<String>,
    #[serde(default)]
    pub field_blocks: Vec<String>,
    #[serde(default)]
    pub key_blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ex_tex_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_blocks: Vec<ExtraBlockDocument>,
    #[serde(default)]
    pub textures: Vec<String>,
}

impl From<&JpaResource> for ParticleDocument {
    fn from(resource: &JpaResource) -> Self {
        Self {
            dynamics_block: Some(hex::encode(&resource.dynamics)),
            field_blocks: resource.field_blocks.iter().map(hex::encode).collect(),
            key_blocks: resource.key_blocks.iter().map(hex::encode).collect(),
            base_shape: Some(hex::encode(&resource.base_shape)),
            extra_shape: Some(hex::encode(&resource.extra_shape)),
            child_shape: resource.child_shape.as_ref().map(hex::encode),
            ex_tex_shape: resource.ex_tex_shape.as_ref().map(hex::encode),
            extra_blocks: resource
                .extra_blocks
                .iter()
                .map(|block| ExtraBlockDocument {
                    kind: block.kind.to_string(),
                    data: hex::encode(&block.data),
                })
                .collect(),
            textures: resource.textures.clone(),
        }
    }
}

impl TryFrom<ParticleDocument> for JpaResource {
    type Error = Error;

    fn try_from(document: ParticleDocument) -> Result<Self> {
        let required = |data: Option<String>, kind: BlockKind| {
            data.ok_or(Error::MissingBlock(kind))
                .and_then(|data| decode_hex(&data, kind.to_string()))
        };
        let optional = |data: Option<String>, kind: BlockKind| {
            data.map(|data| decode_hex(&data, kind.to_string()))
                .transpose()
        };

        let extra_blocks = document
            .extra_blocks
            .iter()
            .map(|block| {
                let kind = BlockKind::from_name(&block.kind)
                    .ok_or_else(|| Error::InvalidBlockKind(block.kind.clone()))?;
                if kind.is_known() {
                    return Err(Error::ReservedExtraKind(kind));
                }
                Ok(OpaqueBlock::new(kind, decode_hex(&block.data, block.kind.clone())?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dynamics: required(document.dynamics_block, BlockKind::Dynamics)?,
            field_blocks: decode_all(&document.field_blocks, BlockKind::Field)?,
            key_blocks: decode_all(&document.key_blocks, BlockKind::Key)?,
            base_shape: required(document.base_shape, BlockKind::BaseShape)?,
            extra_shape: required(document.extra_shape, BlockKind::ExtraShape)?,
            child_shape: optional(document.child_shape, BlockKind::ChildShape)?,
            ex_tex_shape: optional(document.ex_tex_shape, BlockKind::ExTexShape)?,
            extra_blocks,
            textures: document.textures,
        })
    }
}

fn decode_hex(data: &str, block: String) -> Result<Vec<u8>> {
    hex::decode(data).map_err(|source| Error::InvalidHex { block, source })
}

fn decode_all(blocks: &[String], kind: BlockKind) -> Result<Vec<Vec<u8>>> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, data)| decode_hex(data, format!("{kind} #{index}")))
        .collect()
}
