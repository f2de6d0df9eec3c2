//! Input parsing - delimited text lines and rendered row cells into typed
//! field values.
//!
//! Free-text input is inherently fragile (no delimiter escaping), so the
//! fragility is contained here behind an explicit [`Error::Format`] contract:
//! a failed parse never reaches the store.

use chrono::NaiveDate;

use crate::entity::{Entity, Field, FieldType};
use crate::value::FieldValue;
use crate::{Error, Result};

const DELIMITER: char = ',';
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a raw input line into the values for an insert.
///
/// The line is split on commas, each part trimmed and coerced to the
/// declared type of the corresponding insert column (store-assigned keys
/// are not supplied). Wrong part count or a failed coercion is a
/// [`Error::Format`]; callers must not attempt the store operation then.
pub fn parse_create(entity: Entity, raw_line: &str) -> Result<Vec<FieldValue>> {
    let fields = entity.descriptor().insert_fields();
    let parts: Vec<&str> = raw_line.split(DELIMITER).map(str::trim).collect();
    if parts.len() != fields.len() {
        return Err(Error::Format {
            entity,
            message: format!("expected {} fields, got {}", fields.len(), parts.len()),
        });
    }
    coerce_all(entity, fields, &parts)
}

/// Parse the string cells of a previously rendered row back into a full
/// typed row (all columns, descriptor order), for update/delete.
///
/// The cells came from the store's own output, so a coercion failure here
/// is a display/store mismatch rather than bad user input; it still
/// surfaces as [`Error::Format`] instead of reaching the store.
pub fn parse_row(entity: Entity, cells: &[String]) -> Result<Vec<FieldValue>> {
    let fields = entity.descriptor().fields;
    if cells.len() != fields.len() {
        return Err(Error::Format {
            entity,
            message: format!(
                "row has {} cells but {} has {} columns",
                cells.len(),
                entity,
                fields.len()
            ),
        });
    }
    let parts: Vec<&str> = cells.iter().map(|c| c.trim()).collect();
    coerce_all(entity, fields, &parts)
}

/// Parse raw key strings into the primary-key values for a delete.
pub fn parse_key(entity: Entity, raw_keys: &[String]) -> Result<Vec<FieldValue>> {
    let desc = entity.descriptor();
    let key_fields: Vec<&Field> = desc.key_fields().collect();
    if raw_keys.len() != key_fields.len() {
        return Err(Error::Format {
            entity,
            message: format!(
                "expected {} key value(s), got {}",
                key_fields.len(),
                raw_keys.len()
            ),
        });
    }
    key_fields
        .iter()
        .copied()
        .zip(raw_keys)
        .map(|(field, raw)| coerce(entity, field, raw.trim()))
        .collect()
}

fn coerce_all(entity: Entity, fields: &[Field], parts: &[&str]) -> Result<Vec<FieldValue>> {
    fields
        .iter()
        .zip(parts)
        .map(|(field, part)| coerce(entity, field, part))
        .collect()
}

fn coerce(entity: Entity, field: &Field, raw: &str) -> Result<FieldValue> {
    match field.ty {
        FieldType::Integer => raw
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| Error::Format {
                entity,
                message: format!("{}: '{}' is not an integer", field.name, raw),
            }),
        FieldType::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(FieldValue::Date)
            .map_err(|_| Error::Format {
                entity,
                message: format!("{}: '{}' is not a YYYY-MM-DD date", field.name, raw),
            }),
    }
}
