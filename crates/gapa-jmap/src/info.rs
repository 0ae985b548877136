//! JMap table reading and writing.

use byteorder::{BigEndian, ByteOrder};
use gapa_common::{align_up, sjis, BinaryReader, BinaryWriter};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::header::{JMapHeader, RawField};
use crate::{Error, FieldName, FieldType, JMapField, Result, Value};

/// Padding byte used to align the end of a JMap file.
const FILE_PAD: u8 = b'@';

/// Alignment of the whole file.
const FILE_ALIGNMENT: usize = 32;

/// A single entry (row) of a JMap table.
///
/// Holds exactly one value per field of the owning table, in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct JMapEntry {
    values: Vec<Value>,
}

impl JMapEntry {
    /// All values, in field order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the field at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A parsed JMap table.
///
/// A table parsed from bytes keeps its field offsets and entry size so it
/// writes back byte-identically. Adding or removing fields discards the
/// stored layout and a fresh one is computed on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JMapInfo {
    fields: Vec<JMapField>,
    entries: Vec<JMapEntry>,
    entry_size: Option<u32>,
}

impl JMapInfo {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JMap table from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let header: JMapHeader = reader.read_struct()?;

        let entry_count = header.entry_count.get() as usize;
        let field_count = header.field_count.get() as usize;
        let data_offset = header.data_offset.get() as usize;
        let entry_size = header.entry_size.get();

        if entry_size == 0 && entry_count > 0 {
            return Err(Error::ZeroEntrySize { entry_count });
        }

        let fields_end = field_count
            .checked_mul(RawField::SIZE)
            .and_then(|size| size.checked_add(JMapHeader::SIZE))
            .filter(|&end| end <= data.len())
            .ok_or(Error::Truncated {
                section: "field table",
                needed: JMapHeader::SIZE.saturating_add(field_count.saturating_mul(RawField::SIZE)),
                available: data.len(),
            })?;

        let pool_start = entry_count
            .checked_mul(entry_size as usize)
            .and_then(|size| size.checked_add(data_offset))
            .filter(|&end| end <= data.len() && data_offset >= fields_end)
            .ok_or(Error::Truncated {
                section: "entry data",
                needed: data_offset.saturating_add(entry_count.saturating_mul(entry_size as usize)),
                available: data.len(),
            })?;

        // Read fields
        let mut fields = Vec::with_capacity(field_count);
        for index in 0..field_count {
            let raw: RawField = reader.read_struct()?;
            let field = JMapField::from_raw(index, &raw)?;

            let size = field.field_type.size();
            if field.offset as usize + size > entry_size as usize {
                return Err(Error::FieldOutsideEntry {
                    field: field.name.to_string(),
                    offset: field.offset,
                    size,
                    entry_size,
                });
            }

            if let FieldName::Unknown(hash) = field.name {
                warn!("field #{index} has unresolved hash {hash:#010x}");
            }

            fields.push(field);
        }

        // Read entries
        let pool = &data[pool_start..];
        let mut entries = Vec::with_capacity(entry_count);

        for index in 0..entry_count {
            let base = data_offset + index * entry_size as usize;
            let values = fields
                .iter()
                .map(|field| read_value(data, base, field, pool, pool_start, index))
                .collect::<Result<Vec<_>>>()?;
            entries.push(JMapEntry { values });
        }

        Ok(Self {
            fields,
            entries,
            entry_size: Some(entry_size),
        })
    }

    /// Serialize the table to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (offsets, entry_size) = self.layout();
        let field_count = self.fields.len();
        let data_offset = JMapHeader::SIZE + field_count * RawField::SIZE;
        let entry_size = entry_size as usize;

        let mut writer =
            BinaryWriter::with_capacity(data_offset + self.entries.len() * entry_size);
        writer.put_struct(&JMapHeader {
            entry_count: (self.entries.len() as u32).into(),
            field_count: (field_count as u32).into(),
            data_offset: (data_offset as u32).into(),
            entry_size: (entry_size as u32).into(),
        });

        for (field, &offset) in self.fields.iter().zip(&offsets) {
            writer.put_struct(&field.to_raw(offset));
        }

        let mut data = vec![0u8; self.entries.len() * entry_size];
        let mut pool = StringPool::default();

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.values.len() != field_count {
                return Err(Error::EntryArity {
                    entry: index,
                    expected: field_count,
                    actual: entry.values.len(),
                });
            }

            let record = &mut data[index * entry_size..(index + 1) * entry_size];
            for ((field, &offset), value) in self.fields.iter().zip(&offsets).zip(&entry.values) {
                write_value(record, offset as usize, field, value, index, &mut pool)?;
            }
        }

        writer.put_bytes(&data);
        writer.put_bytes(&pool.data);
        writer.align(FILE_ALIGNMENT, FILE_PAD);

        Ok(writer.into_inner())
    }

    /// Field offsets and entry size used when writing.
    fn layout(&self) -> (Vec<u16>, u32) {
        if let Some(entry_size) = self.entry_size {
            let offsets = self.fields.iter().map(|field| field.offset).collect();
            return (offsets, entry_size);
        }

        let mut order: Vec<usize> = (0..self.fields.len()).collect();
        order.sort_by_key(|&index| self.fields[index].field_type.layout_order());

        let mut offsets = vec![0u16; self.fields.len()];
        let mut size = 0usize;
        let mut seen_string_offset = false;

        for index in order {
            let field_type = self.fields[index].field_type;

            // Pooled strings come last and must start word-aligned.
            if field_type == FieldType::StringOffset && !seen_string_offset {
                size = align_up(size, 4);
                seen_string_offset = true;
            }

            offsets[index] = size as u16;
            size += field_type.size();
        }

        (offsets, align_up(size, 4) as u32)
    }

    /// All fields, in descriptor order.
    pub fn fields(&self) -> &[JMapField] {
        &self.fields
    }

    /// All entries.
    pub fn entries(&self) -> &[JMapEntry] {
        &self.entries
    }

    /// The stored entry size, if the layout is fixed.
    pub fn entry_size(&self) -> Option<u32> {
        self.entry_size
    }

    /// Index of the field with the given name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name.as_name() == Some(name))
    }

    /// Value of the named field in entry `entry`.
    pub fn get(&self, entry: usize, name: &str) -> Option<&Value> {
        let index = self.field_index(name)?;
        self.entries.get(entry)?.get(index)
    }

    /// The field with the given name.
    pub fn field(&self, name: &str) -> Option<&JMapField> {
        self.fields.iter().find(|field| field.name.as_name() == Some(name))
    }

    /// Integer value of the named field in entry `entry`.
    pub fn get_int(&self, entry: usize, name: &str) -> Option<i32> {
        self.get(entry, name)?.as_int()
    }

    /// Float value of the named field in entry `entry`.
    pub fn get_float(&self, entry: usize, name: &str) -> Option<f32> {
        self.get(entry, name)?.as_float()
    }

    /// String value of the named field in entry `entry`.
    pub fn get_str(&self, entry: usize, name: &str) -> Option<&str> {
        self.get(entry, name)?.as_str()
    }

    /// Add a field. Existing entries receive the type's default value.
    pub fn new_field(&mut self, name: &str, field_type: FieldType) -> Result<()> {
        if self.field_index(name).is_some() {
            return Err(Error::DuplicateField(name.to_string()));
        }

        self.fields.push(JMapField::new(name, field_type));
        for entry in &mut self.entries {
            entry.values.push(field_type.default_value());
        }
        self.entry_size = None;

        Ok(())
    }

    /// Remove a field and its values from every entry.
    pub fn drop_field(&mut self, name: &str) -> Result<()> {
        let index = self
            .field_index(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;

        self.fields.remove(index);
        for entry in &mut self.entries {
            entry.values.remove(index);
        }
        self.entry_size = None;

        Ok(())
    }

    /// Append an entry. Values must be given in field order.
    pub fn push_entry(&mut self, values: Vec<Value>) -> Result<()> {
        let entry = self.entries.len();

        if values.len() != self.fields.len() {
            return Err(Error::EntryArity {
                entry,
                expected: self.fields.len(),
                actual: values.len(),
            });
        }

        for (field, value) in self.fields.iter().zip(&values) {
            if !field.field_type.accepts(value) {
                return Err(Error::TypeMismatch {
                    entry,
                    field: field.name.to_string(),
                    expected: field.field_type,
                });
            }
        }

        self.entries.push(JMapEntry { values });
        Ok(())
    }

    /// Stable-sort entries by the named field.
    pub fn sort_entries_by(&mut self, name: &str) -> Result<()> {
        let index = self
            .field_index(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;

        self.entries
            .sort_by(|a, b| a.values[index].sort_cmp(&b.values[index]));
        Ok(())
    }
}

/// Read a single value of `field` from the entry starting at `base`.
fn read_value(
    data: &[u8],
    base: usize,
    field: &JMapField,
    pool: &[u8],
    pool_start: usize,
    entry: usize,
) -> Result<Value> {
    let offset = base + field.offset as usize;
    let mut reader = BinaryReader::new_at(data, offset);

    let value = match field.field_type {
        FieldType::Long | FieldType::Long2 => Value::Int(field.unpack_int(reader.read_u32()?)),
        FieldType::Short => Value::Int(field.unpack_int(reader.read_u16()? as u32)),
        FieldType::Char => Value::Int(field.unpack_int(reader.read_u8()? as u32)),
        FieldType::Float => Value::Float(reader.read_f32()?),
        FieldType::String => {
            let bytes = reader.read_bytes(FieldType::String.size())?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Value::String(sjis::decode(&bytes[..end], offset)?)
        }
        FieldType::StringOffset => {
            let string_offset = reader.read_u32()?;
            if string_offset as usize >= pool.len() {
                return Err(Error::StringOffsetOutOfBounds {
                    entry,
                    field: field.name.to_string(),
                    offset: string_offset,
                    pool_size: pool.len(),
                });
            }

            let mut pool_reader = BinaryReader::new_at(pool, string_offset as usize);
            let bytes = pool_reader.read_cstring_bytes()?;
            Value::String(sjis::decode(bytes, pool_start + string_offset as usize)?)
        }
    };

    Ok(value)
}

/// Write a single value of `field` into `record` at `offset`.
fn write_value(
    record: &mut [u8],
    offset: usize,
    field: &JMapField,
    value: &Value,
    entry: usize,
    pool: &mut StringPool,
) -> Result<()> {
    let mismatch = || Error::TypeMismatch {
        entry,
        field: field.name.to_string(),
        expected: field.field_type,
    };

    match field.field_type {
        FieldType::Long | FieldType::Long2 => {
            let value = value.as_int().ok_or_else(mismatch)?;
            let slot = &mut record[offset..offset + 4];
            let raw = field.pack_int(BigEndian::read_u32(slot), value);
            BigEndian::write_u32(slot, raw);
        }
        FieldType::Short => {
            let value = value.as_int().ok_or_else(mismatch)?;
            let slot = &mut record[offset..offset + 2];
            let raw = field.pack_int(BigEndian::read_u16(slot) as u32, value);
            BigEndian::write_u16(slot, raw as u16);
        }
        FieldType::Char => {
            let value = value.as_int().ok_or_else(mismatch)?;
            record[offset] = field.pack_int(record[offset] as u32, value) as u8;
        }
        FieldType::Float => {
            let value = value.as_float().ok_or_else(mismatch)?;
            BigEndian::write_f32(&mut record[offset..offset + 4], value);
        }
        FieldType::String => {
            let text = value.as_str().ok_or_else(mismatch)?;
            let bytes = sjis::encode(text)?;
            let max = FieldType::String.size();
            if bytes.len() > max {
                return Err(Error::StringTooLong {
                    entry,
                    field: field.name.to_string(),
                    length: bytes.len(),
                    max,
                });
            }
            record[offset..offset + bytes.len()].copy_from_slice(&bytes);
        }
        FieldType::StringOffset => {
            let text = value.as_str().ok_or_else(mismatch)?;
            let string_offset = pool.add(text)?;
            BigEndian::write_u32(&mut record[offset..offset + 4], string_offset);
        }
    }

    Ok(())
}

/// String pool builder with de-duplication.
#[derive(Debug, Default)]
struct StringPool {
    data: Vec<u8>,
    offsets: FxHashMap<String, u32>,
}

impl StringPool {
    /// Add a string, returning its pool offset.
    fn add(&mut self, text: &str) -> Result<u32> {
        if let Some(&offset) = self.offsets.get(text) {
            return Ok(offset);
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(&sjis::encode_cstring(text)?);
        self.offsets.insert(text.to_string(), offset);
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f`, returning its result and every warning it logged.
    fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        (result, output)
    }

    fn names_table() -> JMapInfo {
        let mut table = JMapInfo::new();
        table.new_field("name", FieldType::StringOffset).unwrap();
        table.new_field("id", FieldType::Long).unwrap();
        table
    }

    #[test]
    fn test_write_exact_bytes() {
        let mut table = names_table();
        table.push_entry(vec![Value::from("Kinopio"), Value::Int(0)]).unwrap();

        let expected = hex::decode(concat!(
            "00000001", "00000002", "00000028", "00000008",
            "00337a8b", "ffffffff", "0004", "00", "06",
            "00000d1b", "ffffffff", "0000", "00", "00",
            "00000000", "00000000",
            "4b696e6f70696f00",
            "4040404040404040",
        ))
        .unwrap();

        assert_eq!(table.to_bytes().unwrap(), expected);
    }

    #[test]
    fn test_unknown_hash_roundtrip() {
        let bytes = hex::decode(concat!(
            "00000001", "00000001", "0000001c", "00000004",
            "deadbeef", "ffffffff", "0000", "00", "00",
            "0000002a",
        ))
        .unwrap();

        let (table, warnings) = capture_warnings(|| JMapInfo::parse(&bytes).unwrap());
        assert!(warnings.contains("unresolved hash 0xdeadbeef"));
        assert_eq!(table.fields()[0].name, FieldName::Unknown(0xDEADBEEF));
        assert_eq!(table.entries()[0].values(), &[Value::Int(42)]);
        assert_eq!(table.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_parse_roundtrip_all_types() {
        let mut table = JMapInfo::new();
        table.new_field("GroupName", FieldType::StringOffset).unwrap();
        table.new_field("OffsetX", FieldType::Float).unwrap();
        table.new_field("StartFrame", FieldType::Long).unwrap();
        table.new_field("EndFrame", FieldType::Long2).unwrap();
        table.new_field("l_id", FieldType::Short).unwrap();
        table.new_field("No", FieldType::Char).unwrap();
        table.new_field("ZoneName", FieldType::String).unwrap();

        table
            .push_entry(vec![
                Value::from("エフェクト"),
                Value::Float(-12.5),
                Value::Int(30),
                Value::Int(-1),
                Value::Int(-300),
                Value::Int(-7),
                Value::from("InlineZone"),
            ])
            .unwrap();
        table
            .push_entry(vec![
                Value::from("エフェクト"),
                Value::Float(0.1),
                Value::Int(i32::MAX),
                Value::Int(i32::MIN),
                Value::Int(32767),
                Value::Int(127),
                Value::from(""),
            ])
            .unwrap();

        let bytes = table.to_bytes().unwrap();
        assert_eq!(bytes.len() % 32, 0);

        let parsed = JMapInfo::parse(&bytes).unwrap();
        assert_eq!(parsed.entries(), table.entries());
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
        assert_eq!(JMapInfo::parse(&parsed.to_bytes().unwrap()).unwrap(), parsed);
    }

    #[test]
    fn test_fresh_layout_groups_by_type() {
        let mut table = JMapInfo::new();
        table.new_field("name", FieldType::StringOffset).unwrap();
        table.new_field("l_id", FieldType::Short).unwrap();
        table.new_field("OffsetX", FieldType::Float).unwrap();

        let bytes = table.to_bytes().unwrap();
        let parsed = JMapInfo::parse(&bytes).unwrap();

        let offsets: Vec<u16> = parsed.fields().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![8, 4, 0]);
        assert_eq!(parsed.entry_size(), Some(12));
    }

    #[test]
    fn test_pool_deduplicates_strings() {
        let mut table = names_table();
        table.push_entry(vec![Value::from("same"), Value::Int(0)]).unwrap();
        table.push_entry(vec![Value::from("same"), Value::Int(1)]).unwrap();

        let bytes = table.to_bytes().unwrap();
        // header + 2 fields + 2 entries + "same\0", padded to 64
        let pool_start = 0x28 + 2 * 8;
        assert_eq!(&bytes[pool_start..pool_start + 5], b"same\0");
        assert_eq!(bytes[pool_start + 5], b'@');
    }

    #[test]
    fn test_shared_word_bitfields_roundtrip() {
        let bytes = hex::decode(concat!(
            "00000001", "00000002", "00000028", "00000004",
            "00000001", "ffff0000", "0000", "10", "00",
            "00000002", "0000ffff", "0000", "00", "00",
            "1234abcd",
            "4040404040404040404040404040404040404040",
        ))
        .unwrap();

        let table = JMapInfo::parse(&bytes).unwrap();
        assert_eq!(
            table.entries()[0].values(),
            &[Value::Int(0x1234), Value::Int(0xABCD)]
        );
        assert_eq!(table.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_truncated_entries() {
        let bytes = hex::decode(concat!(
            "00000002", "00000001", "0000001c", "00000004",
            "deadbeef", "ffffffff", "0000", "00", "00",
            "0000002a",
        ))
        .unwrap();

        let err = JMapInfo::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::Truncated { section: "entry data", .. }));
        assert_eq!(err.kind(), gapa_common::ErrorKind::Format);
    }

    #[test]
    fn test_zero_entry_size_with_entries() {
        let bytes = hex::decode(concat!("ffffffff", "00000000", "00000010", "00000000")).unwrap();

        let err = JMapInfo::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::ZeroEntrySize { entry_count: 0xFFFF_FFFF }));
        assert_eq!(err.kind(), gapa_common::ErrorKind::Format);
    }

    #[test]
    fn test_empty_table_with_zero_entry_size() {
        let bytes = hex::decode(concat!("00000000", "00000000", "00000010", "00000000")).unwrap();
        let table = JMapInfo::parse(&bytes).unwrap();
        assert!(table.entries().is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let err = JMapInfo::parse(&[0, 0, 0, 1]).unwrap_err();
        assert_eq!(err.kind(), gapa_common::ErrorKind::Format);
    }

    #[test]
    fn test_field_outside_entry() {
        let bytes = hex::decode(concat!(
            "00000001", "00000001", "0000001c", "00000004",
            "deadbeef", "ffffffff", "0002", "00", "00",
            "0000002a",
        ))
        .unwrap();

        assert!(matches!(
            JMapInfo::parse(&bytes),
            Err(Error::FieldOutsideEntry { offset: 2, size: 4, entry_size: 4, .. })
        ));
    }

    #[test]
    fn test_unknown_field_type() {
        let bytes = hex::decode(concat!(
            "00000001", "00000001", "0000001c", "00000004",
            "deadbeef", "ffffffff", "0000", "00", "09",
            "0000002a",
        ))
        .unwrap();

        assert!(matches!(
            JMapInfo::parse(&bytes),
            Err(Error::UnknownFieldType { index: 0, tag: 9 })
        ));
    }

    #[test]
    fn test_string_offset_out_of_bounds() {
        let bytes = hex::decode(concat!(
            "00000001", "00000001", "0000001c", "00000004",
            "00337a8b", "ffffffff", "0000", "00", "06",
            "00000100", "61620000",
        ))
        .unwrap();

        assert!(matches!(
            JMapInfo::parse(&bytes),
            Err(Error::StringOffsetOutOfBounds { offset: 0x100, .. })
        ));
    }

    #[test]
    fn test_new_field_fills_defaults() {
        let mut table = names_table();
        table.push_entry(vec![Value::from("a"), Value::Int(3)]).unwrap();
        table.new_field("OffsetX", FieldType::Float).unwrap();

        assert_eq!(table.get_float(0, "OffsetX"), Some(0.0));
        assert_eq!(table.get_str(0, "name"), Some("a"));
        assert_eq!(table.get_int(0, "id"), Some(3));
        assert_eq!(table.field("OffsetX").map(|f| f.field_type), Some(FieldType::Float));
        assert!(matches!(
            table.new_field("id", FieldType::Long),
            Err(Error::DuplicateField(_))
        ));
    }

    #[test]
    fn test_drop_field() {
        let mut table = names_table();
        table.push_entry(vec![Value::from("a"), Value::Int(3)]).unwrap();
        table.drop_field("name").unwrap();

        assert_eq!(table.fields().len(), 1);
        assert_eq!(table.entries()[0].values(), &[Value::Int(3)]);
        assert!(matches!(table.drop_field("name"), Err(Error::FieldNotFound(_))));
    }

    #[test]
    fn test_push_entry_type_mismatch() {
        let mut table = names_table();
        let err = table
            .push_entry(vec![Value::Int(1), Value::Int(0)])
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: FieldType::StringOffset, .. }));
        assert_eq!(err.kind(), gapa_common::ErrorKind::Validation);
    }

    #[test]
    fn test_sort_entries_is_stable() {
        let mut table = names_table();
        for (name, id) in [("b", 0), ("a", 1), ("b", 2), ("a", 3)] {
            table.push_entry(vec![Value::from(name), Value::Int(id)]).unwrap();
        }
        table.sort_entries_by("name").unwrap();

        let ids: Vec<i32> = table
            .entries()
            .iter()
            .map(|e| e.values()[1].as_int().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_inline_string_too_long() {
        let mut table = JMapInfo::new();
        table.new_field("ZoneName", FieldType::String).unwrap();
        table.push_entry(vec![Value::from("x".repeat(33))]).unwrap();

        assert!(matches!(
            table.to_bytes(),
            Err(Error::StringTooLong { length: 33, max: 32, .. })
        ));
    }
}
