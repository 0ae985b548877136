//! Field name hashing for JMap tables.
//!
//! JMap files identify columns by a 32-bit hash of the field name instead
//! of the name itself. This module computes that hash and provides a
//! lookup dictionary to reverse known hashes back to their names.

use std::sync::LazyLock;

use gapa_common::sjis;
use rustc_hash::FxHashMap;

/// Compute the JMap hash of a field name.
///
/// The hash runs over the Shift-JIS bytes of the name: `h = h * 31 + b`,
/// where bytes above 0x80 are sign-extended first.
pub fn calc_hash(name: &str) -> u32 {
    let bytes = sjis::encode(name).unwrap_or_else(|_| name.as_bytes().to_vec());

    bytes.iter().fold(0u32, |hash, &byte| {
        let ch = if byte > 0x80 {
            byte as i8 as i32 as u32
        } else {
            byte as u32
        };
        hash.wrapping_mul(31).wrapping_add(ch)
    })
}

/// Known field names.
///
/// Covers every column of the particle tables (ParticleNames and
/// AutoEffectList) plus common placement fields seen in other tables.
static KNOWN_NAMES: &[&str] = &[
    // ParticleNames
    "name",
    "id",
    // AutoEffectList
    "No",
    "GroupName",
    "AnimName",
    "ContinueAnimEnd",
    "UniqueName",
    "EffectName",
    "ParentName",
    "JointName",
    "OffsetX",
    "OffsetY",
    "OffsetZ",
    "StartFrame",
    "EndFrame",
    "Affect",
    "Follow",
    "ScaleValue",
    "RateValue",
    "PrmColor",
    "EnvColor",
    "LightAffectValue",
    "DrawOrder",
    // Common placement fields
    "l_id",
    "pos_x",
    "pos_y",
    "pos_z",
    "dir_x",
    "dir_y",
    "dir_z",
    "scale_x",
    "scale_y",
    "scale_z",
    "ZoneName",
    "ScenarioNo",
];

/// Lookup table from hash to name.
static NAME_LOOKUP: LazyLock<FxHashMap<u32, &'static str>> = LazyLock::new(|| {
    KNOWN_NAMES
        .iter()
        .map(|&name| (calc_hash(name), name))
        .collect()
});

/// Look up the field name for a hash.
pub fn find_name(hash: u32) -> Option<&'static str> {
    NAME_LOOKUP.get(&hash).copied()
}

/// Check whether a hash belongs to a known field name.
pub fn is_known_hash(hash: u32) -> bool {
    NAME_LOOKUP.contains_key(&hash)
}
