//! The ParticleNames table: a name for every particle in the container.
//!
//! Each row holds a `name` and the container position (`id`) of the
//! particle it names. Rows are sorted by name because the game looks
//! particles up by binary search.

use gapa_jmap::{FieldType, JMapInfo, Value};

use crate::{Error, Result};

const NAME_FIELD: &str = "name";
const ID_FIELD: &str = "id";

/// Read particle names, indexed by container position.
///
/// Every position below `particle_count` must be named exactly once.
pub fn names_from_table(table: &JMapInfo, particle_count: usize) -> Result<Vec<String>> {
    let mut names: Vec<Option<String>> = vec![None; particle_count];

    for record in 0..table.entries().len() {
        let name = table
            .get(record, NAME_FIELD)
            .ok_or(Error::MissingField {
                record,
                field: NAME_FIELD,
            })?
            .as_str()
            .ok_or(Error::FieldType {
                record,
                field: NAME_FIELD,
                expected: "string",
            })?;
        let id = table
            .get(record, ID_FIELD)
            .ok_or(Error::MissingField {
                record,
                field: ID_FIELD,
            })?
            .as_int()
            .ok_or(Error::FieldType {
                record,
                field: ID_FIELD,
                expected: "integer",
            })?;

        let slot = usize::try_from(id)
            .ok()
            .and_then(|position| names.get_mut(position))
            .ok_or_else(|| Error::ParticleIdOutOfRange {
                name: name.to_string(),
                id,
                count: particle_count,
            })?;

        if let Some(first) = slot {
            return Err(Error::DuplicateParticleId {
                id: id as usize,
                first: first.clone(),
                second: name.to_string(),
            });
        }
        *slot = Some(name.to_string());
    }

    names
        .into_iter()
        .enumerate()
        .map(|(id, name)| name.ok_or(Error::UnnamedParticle(id)))
        .collect()
}

/// Build the table for particles named in container order.
pub fn names_to_table(names: &[String]) -> Result<JMapInfo> {
    let mut table = JMapInfo::new();
    table.new_field(NAME_FIELD, FieldType::StringOffset)?;
    table.new_field(ID_FIELD, FieldType::Long)?;

    for (id, name) in names.iter().enumerate() {
        table.push_entry(vec![Value::from(name.as_str()), Value::Int(id as i32)])?;
    }

    table.sort_entries_by(NAME_FIELD)?;
    Ok(table)
}
