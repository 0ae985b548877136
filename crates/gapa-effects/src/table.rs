//! AutoEffectList table mapping.

use gapa_jmap::{FieldType, JMapInfo, Value};
use tracing::{debug, warn};

use crate::{EffectEntry, Error, Result};

/// Fields of the AutoEffectList table, in the order they are written.
pub const EFFECT_FIELDS: &[(&str, FieldType)] = &[
    ("No", FieldType::Long),
    ("GroupName", FieldType::StringOffset),
    ("AnimName", FieldType::StringOffset),
    ("ContinueAnimEnd", FieldType::StringOffset),
    ("UniqueName", FieldType::StringOffset),
    ("EffectName", FieldType::StringOffset),
    ("ParentName", FieldType::StringOffset),
    ("JointName", FieldType::StringOffset),
    ("OffsetX", FieldType::Float),
    ("OffsetY", FieldType::Float),
    ("OffsetZ", FieldType::Float),
    ("StartFrame", FieldType::Long),
    ("EndFrame", FieldType::Long),
    ("Affect", FieldType::StringOffset),
    ("Follow", FieldType::StringOffset),
    ("ScaleValue", FieldType::Float),
    ("RateValue", FieldType::Float),
    ("PrmColor", FieldType::StringOffset),
    ("EnvColor", FieldType::StringOffset),
    ("LightAffectValue", FieldType::Float),
    ("DrawOrder", FieldType::StringOffset),
];

const LIST_SEPARATOR: &str = " ";
const FLAG_SEPARATOR: &str = "/";
const ENABLED: &str = "on";

/// Typed access to one row of the table.
struct Record<'a> {
    table: &'a JMapInfo,
    index: usize,
}

impl Record<'_> {
    fn value(&self, field: &'static str) -> Option<&Value> {
        self.table.get(self.index, field)
    }

    fn mismatch(&self, field: &'static str, expected: &'static str) -> Error {
        Error::FieldType {
            record: self.index,
            field,
            expected,
        }
    }

    fn required(&self, field: &'static str) -> Result<String> {
        self.string(field)?.ok_or(Error::MissingField {
            record: self.index,
            field,
        })
    }

    fn string(&self, field: &'static str) -> Result<Option<String>> {
        self.value(field)
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.mismatch(field, "string"))
            })
            .transpose()
    }

    fn string_or_default(&self, field: &'static str) -> Result<String> {
        Ok(self.string(field)?.unwrap_or_default())
    }

    fn list(&self, field: &'static str, separator: &str) -> Result<Vec<String>> {
        Ok(split(&self.string_or_default(field)?, separator))
    }

    fn int(&self, field: &'static str, default: i32) -> Result<i32> {
        match self.value(field) {
            None => Ok(default),
            Some(value) => value.as_int().ok_or_else(|| self.mismatch(field, "integer")),
        }
    }

    fn float(&self, field: &'static str, default: f32) -> Result<f32> {
        match self.value(field) {
            None => Ok(default),
            Some(value) => value.as_float().ok_or_else(|| self.mismatch(field, "float")),
        }
    }
}

fn split(text: &str, separator: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(separator).map(str::to_string).collect()
}

/// Convert an AutoEffectList table into editable entries.
///
/// `No` is dropped; it is recomputed from the entry position on write.
/// Missing optional columns read as their default.
pub fn to_entries(table: &JMapInfo) -> Result<Vec<EffectEntry>> {
    let defaults = EffectEntry::default();
    let mut entries = Vec::with_capacity(table.entries().len());

    for index in 0..table.entries().len() {
        let record = Record { table, index };
        let continue_anim_end = record.string_or_default("ContinueAnimEnd")?;

        let entry = EffectEntry {
            group_name: record.required("GroupName")?,
            anim_name: record.list("AnimName", LIST_SEPARATOR)?,
            continue_anim_end: continue_anim_end == ENABLED,
            unique_name: record.required("UniqueName")?,
            effect_name: record.list("EffectName", LIST_SEPARATOR)?,
            parent_name: record.string_or_default("ParentName")?,
            joint_name: record.string_or_default("JointName")?,
            offset_x: record.float("OffsetX", defaults.offset_x)?,
            offset_y: record.float("OffsetY", defaults.offset_y)?,
            offset_z: record.float("OffsetZ", defaults.offset_z)?,
            start_frame: record.int("StartFrame", defaults.start_frame)?,
            end_frame: record.int("EndFrame", defaults.end_frame)?,
            affect: record.list("Affect", FLAG_SEPARATOR)?,
            follow: record.list("Follow", FLAG_SEPARATOR)?,
            scale_value: record.float("ScaleValue", defaults.scale_value)?,
            rate_value: record.float("RateValue", defaults.rate_value)?,
            prm_color: record.string_or_default("PrmColor")?,
            env_color: record.string_or_default("EnvColor")?,
            light_affect_value: record.float("LightAffectValue", defaults.light_affect_value)?,
            draw_order: record
                .string("DrawOrder")?
                .unwrap_or_else(|| defaults.draw_order.clone()),
        };

        if !entry.has_known_draw_order() {
            warn!("{}: unknown draw order {:?}", entry.description(), entry.draw_order);
        }
        if !continue_anim_end.is_empty() && continue_anim_end != ENABLED {
            warn!(
                "{}: ContinueAnimEnd {:?} is neither \"on\" nor empty, read as off",
                entry.description(),
                continue_anim_end
            );
        }

        entries.push(entry);
    }

    debug!("read {} effect entries", entries.len());
    Ok(entries)
}

/// Build an AutoEffectList table from entries.
///
/// `No` is the entry's position in `entries`. Rows are then stably sorted
/// by `GroupName`, since the game looks groups up by binary search.
pub fn to_table(entries: &[EffectEntry]) -> Result<JMapInfo> {
    let mut table = JMapInfo::new();
    for &(name, field_type) in EFFECT_FIELDS {
        table.new_field(name, field_type)?;
    }

    for (index, entry) in entries.iter().enumerate() {
        if !entry.has_known_draw_order() {
            warn!("{}: unknown draw order {:?}", entry.description(), entry.draw_order);
        }

        let continue_anim_end = if entry.continue_anim_end { ENABLED } else { "" };

        table.push_entry(vec![
            Value::Int(index as i32),
            Value::from(entry.group_name.as_str()),
            Value::from(entry.anim_name.join(LIST_SEPARATOR)),
            Value::from(continue_anim_end),
            Value::from(entry.unique_name.as_str()),
            Value::from(entry.effect_name.join(LIST_SEPARATOR)),
            Value::from(entry.parent_name.as_str()),
            Value::from(entry.joint_name.as_str()),
            Value::Float(entry.offset_x),
            Value::Float(entry.offset_y),
            Value::Float(entry.offset_z),
            Value::Int(entry.start_frame),
            Value::Int(entry.end_frame),
            Value::from(entry.affect.join(FLAG_SEPARATOR)),
            Value::from(entry.follow.join(FLAG_SEPARATOR)),
            Value::Float(entry.scale_value),
            Value::Float(entry.rate_value),
            Value::from(entry.prm_color.as_str()),
            Value::from(entry.env_color.as_str()),
            Value::Float(entry.light_affect_value),
            Value::from(entry.draw_order.as_str()),
        ])?;
    }

    table.sort_entries_by("GroupName")?;
    Ok(table)
}
