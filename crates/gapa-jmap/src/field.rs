//! JMap field descriptors.

use crate::hash::{calc_hash, find_name};
use crate::header::RawField;
use crate::{Error, Result, Value};

/// Data types of JMap fields.
///
/// The values are the actual type tags from the file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    /// 32-bit integer.
    Long = 0,
    /// Fixed 32-byte inline string.
    String = 1,
    /// 32-bit float.
    Float = 2,
    /// 32-bit integer (second variant, read identically).
    Long2 = 3,
    /// 16-bit integer.
    Short = 4,
    /// 8-bit integer.
    Char = 5,
    /// 32-bit offset into the string pool.
    StringOffset = 6,
}

impl FieldType {
    /// Parse from a type tag.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Long),
            1 => Some(Self::String),
            2 => Some(Self::Float),
            3 => Some(Self::Long2),
            4 => Some(Self::Short),
            5 => Some(Self::Char),
            6 => Some(Self::StringOffset),
            _ => None,
        }
    }

    /// Number of bytes a value occupies inside an entry.
    pub const fn size(self) -> usize {
        match self {
            Self::Long | Self::Float | Self::Long2 | Self::StringOffset => 4,
            Self::String => 32,
            Self::Short => 2,
            Self::Char => 1,
        }
    }

    /// Mask given to newly created fields of this type.
    pub const fn default_mask(self) -> u32 {
        match self {
            Self::String => 0,
            Self::Short => 0xFFFF,
            Self::Char => 0xFF,
            Self::Long | Self::Float | Self::Long2 | Self::StringOffset => 0xFFFF_FFFF,
        }
    }

    /// Placement order used when computing a fresh entry layout.
    ///
    /// The game's own tools group fields by type in this order, so laying
    /// out new tables the same way reproduces their files.
    pub const fn layout_order(self) -> u8 {
        match self {
            Self::String => 0,
            Self::Float => 1,
            Self::Long => 2,
            Self::Long2 => 3,
            Self::Short => 4,
            Self::Char => 5,
            Self::StringOffset => 6,
        }
    }

    /// Value given to existing entries when a field of this type is added.
    pub fn default_value(self) -> Value {
        match self {
            Self::Long | Self::Long2 | Self::Short | Self::Char => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String | Self::StringOffset => Value::String(String::new()),
        }
    }

    /// Whether `value` can be stored in a field of this type.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Long | Self::Long2 | Self::Short | Self::Char, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::String | Self::StringOffset, Value::String(_))
        )
    }
}

/// Identity of a field.
///
/// Field names are only stored as hashes. Hashes found in the known-name
/// dictionary resolve to [`FieldName::Named`]; all others are kept as
/// [`FieldName::Unknown`] so they survive a round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// A field whose name is known.
    Named(String),
    /// A field known only by its hash.
    Unknown(u32),
}

impl FieldName {
    /// Resolve a hash through the known-name dictionary.
    pub fn from_hash(hash: u32) -> Self {
        match find_name(hash) {
            Some(name) => Self::Named(name.to_string()),
            None => Self::Unknown(hash),
        }
    }

    /// The hash written to the file.
    pub fn hash(&self) -> u32 {
        match self {
            Self::Named(name) => calc_hash(name),
            Self::Unknown(hash) => *hash,
        }
    }

    /// The name, if known.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Unknown(hash) => write!(f, "[{hash:08X}]"),
        }
    }
}

/// A field (column) of a JMap table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JMapField {
    /// Field identity.
    pub name: FieldName,
    /// Value type.
    pub field_type: FieldType,
    /// Bit mask applied to integer values.
    pub mask: u32,
    /// Right shift applied after masking.
    pub shift: u8,
    /// Offset of the value inside an entry.
    pub offset: u16,
}

impl JMapField {
    /// Create a new field with the type's default mask and no shift.
    ///
    /// The offset is assigned when the table layout is computed.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: FieldName::Named(name.into()),
            field_type,
            mask: field_type.default_mask(),
            shift: 0,
            offset: 0,
        }
    }

    /// Build a field from its on-disk descriptor.
    pub(crate) fn from_raw(index: usize, raw: &RawField) -> Result<Self> {
        let field_type = FieldType::from_u8(raw.field_type).ok_or(Error::UnknownFieldType {
            index,
            tag: raw.field_type,
        })?;

        Ok(Self {
            name: FieldName::from_hash(raw.hash.get()),
            field_type,
            mask: raw.mask.get(),
            shift: raw.shift,
            offset: raw.offset.get(),
        })
    }

    /// Convert to an on-disk descriptor, using `offset` as the entry offset.
    pub(crate) fn to_raw(&self, offset: u16) -> RawField {
        RawField {
            hash: self.name.hash().into(),
            mask: self.mask.into(),
            offset: offset.into(),
            shift: self.shift,
            field_type: self.field_type as u8,
        }
    }

    /// Extract an integer from its raw storage word.
    pub(crate) fn unpack_int(&self, raw: u32) -> i32 {
        let value = (raw & self.mask).checked_shr(self.shift as u32).unwrap_or(0);
        match self.field_type {
            FieldType::Short => value as u16 as i16 as i32,
            FieldType::Char => value as u8 as i8 as i32,
            _ => value as i32,
        }
    }

    /// Merge an integer into its raw storage word, leaving bits outside the mask intact.
    pub(crate) fn pack_int(&self, raw: u32, value: i32) -> u32 {
        let bits = (value as u32).checked_shl(self.shift as u32).unwrap_or(0) & self.mask;
        (raw & !self.mask) | bits
    }
}
