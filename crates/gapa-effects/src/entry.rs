//! The editable form of an AutoEffectList record.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Draw orders the game knows about. Empty means "undefined".
pub const DRAW_ORDERS: &[&str] = &[
    "",
    "3D",
    "PAUSE_IGNORE",
    "INDIRECT",
    "AFTER_INDIRECT",
    "BLOOM_EFFECT",
    "AFTER_IMAGE_EFFECT",
    "2D",
    "2D_PAUSE_IGNORE",
    "FOR_2D_MODEL",
    "WORLD_MAP_MINI_ICON",
];

const DEFAULT_DRAW_ORDER: &str = "3D";

/// One automatic effect: a particle emitted for an actor's animation.
///
/// Serialized with the table's field names. Fields equal to their default
/// are left out; `GroupName` and `UniqueName` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    /// Actor (object) name the effect belongs to.
    #[serde(rename = "GroupName")]
    pub group_name: String,

    /// Animations that trigger the effect.
    #[serde(rename = "AnimName", default, skip_serializing_if = "Vec::is_empty")]
    pub anim_name: Vec<String>,

    /// Keep the effect alive after the animation ends.
    #[serde(rename = "ContinueAnimEnd", default, skip_serializing_if = "is_false")]
    pub continue_anim_end: bool,

    /// Name of the effect within its group.
    #[serde(rename = "UniqueName")]
    pub unique_name: String,

    /// Particles to emit.
    #[serde(rename = "EffectName", default, skip_serializing_if = "Vec::is_empty")]
    pub effect_name: Vec<String>,

    #[serde(rename = "ParentName", default, skip_serializing_if = "String::is_empty")]
    pub parent_name: String,

    /// Joint the effect is attached to.
    #[serde(rename = "JointName", default, skip_serializing_if = "String::is_empty")]
    pub joint_name: String,

    #[serde(rename = "OffsetX", default, skip_serializing_if = "is_zero", with = "float")]
    pub offset_x: f32,

    #[serde(rename = "OffsetY", default, skip_serializing_if = "is_zero", with = "float")]
    pub offset_y: f32,

    #[serde(rename = "OffsetZ", default, skip_serializing_if = "is_zero", with = "float")]
    pub offset_z: f32,

    #[serde(rename = "StartFrame", default, skip_serializing_if = "is_zero_frame")]
    pub start_frame: i32,

    /// Last frame, `-1` for the whole animation.
    #[serde(rename = "EndFrame", default = "default_end_frame", skip_serializing_if = "is_default_end_frame")]
    pub end_frame: i32,

    /// Matrix components (`T`, `R`, `S`) of the joint applied once at spawn.
    #[serde(rename = "Affect", default, skip_serializing_if = "Vec::is_empty")]
    pub affect: Vec<String>,

    /// Matrix components the effect keeps following.
    #[serde(rename = "Follow", default, skip_serializing_if = "Vec::is_empty")]
    pub follow: Vec<String>,

    #[serde(rename = "ScaleValue", default = "one", skip_serializing_if = "is_one", with = "float")]
    pub scale_value: f32,

    #[serde(rename = "RateValue", default = "one", skip_serializing_if = "is_one", with = "float")]
    pub rate_value: f32,

    #[serde(rename = "PrmColor", default, skip_serializing_if = "String::is_empty")]
    pub prm_color: String,

    #[serde(rename = "EnvColor", default, skip_serializing_if = "String::is_empty")]
    pub env_color: String,

    #[serde(rename = "LightAffectValue", default, skip_serializing_if = "is_zero", with = "float")]
    pub light_affect_value: f32,

    /// Render pass, one of [`DRAW_ORDERS`] for effects the game handles.
    #[serde(rename = "DrawOrder", default = "default_draw_order", skip_serializing_if = "is_default_draw_order")]
    pub draw_order: String,
}

impl Default for EffectEntry {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            anim_name: Vec::new(),
            continue_anim_end: false,
            unique_name: String::new(),
            effect_name: Vec::new(),
            parent_name: String::new(),
            joint_name: String::new(),
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
            start_frame: 0,
            end_frame: default_end_frame(),
            affect: Vec::new(),
            follow: Vec::new(),
            scale_value: one(),
            rate_value: one(),
            prm_color: String::new(),
            env_color: String::new(),
            light_affect_value: 0.0,
            draw_order: default_draw_order(),
        }
    }
}

impl EffectEntry {
    /// Create an entry with every optional field at its default.
    pub fn new(group_name: impl Into<String>, unique_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            unique_name: unique_name.into(),
            ..Self::default()
        }
    }

    /// `Group::Unique`, with `(undefined)` for empty names.
    pub fn description(&self) -> String {
        let or_undefined = |name: &str| {
            if name.is_empty() {
                "(undefined)".to_string()
            } else {
                name.to_string()
            }
        };
        format!(
            "{}::{}",
            or_undefined(&self.group_name),
            or_undefined(&self.unique_name)
        )
    }

    /// Whether the draw order is one the game handles.
    pub fn has_known_draw_order(&self) -> bool {
        DRAW_ORDERS.contains(&self.draw_order.as_str())
    }
}

/// Parse an effect list from JSON.
///
/// Every entry must carry `GroupName` and `UniqueName`; the first entry
/// without them fails the whole list.
pub fn entries_from_json(json: &str) -> Result<Vec<EffectEntry>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let records = value.as_array().ok_or(Error::NotAnArray)?;

    for (record, entry) in records.iter().enumerate() {
        let object = entry.as_object().ok_or(Error::NotAnArray)?;
        for field in ["GroupName", "UniqueName"] {
            if !object.contains_key(field) {
                return Err(Error::MissingField { record, field });
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// JSON has no non-finite numbers, so they are written as strings.
///
/// `null` also reads as NaN, which is what serde_json emits for a bare
/// non-finite `f32`.
mod float {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(f32::NAN),
            Some(Repr::Number(value)) => Ok(value),
            Some(Repr::Text(text)) => match text.as_str() {
                "NaN" => Ok(f32::NAN),
                "Infinity" => Ok(f32::INFINITY),
                "-Infinity" => Ok(f32::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"a number, \"NaN\", \"Infinity\" or \"-Infinity\"",
                )),
            },
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

// Bit comparison keeps -0.0 explicit.
fn is_zero(value: &f32) -> bool {
    value.to_bits() == 0
}

fn is_zero_frame(value: &i32) -> bool {
    *value == 0
}

fn one() -> f32 {
    1.0
}

fn is_one(value: &f32) -> bool {
    value.to_bits() == one().to_bits()
}

fn default_end_frame() -> i32 {
    -1
}

fn is_default_end_frame(value: &i32) -> bool {
    *value == default_end_frame()
}

fn default_draw_order() -> String {
    DEFAULT_DRAW_ORDER.to_string()
}

fn is_default_draw_order(value: &String) -> bool {
    value == DEFAULT_DRAW_ORDER
}
