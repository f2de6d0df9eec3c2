//! Typed field values - the unit of data moving between parser, store,
//! and presentation.

use chrono::NaiveDate;
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;
use serde::Serialize;

use crate::entity::FieldType;

/// A single typed cell. Always bound as a statement parameter, never
/// interpolated into SQL text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// The declared type this value satisfies
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Date(_) => FieldType::Date,
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Integer(i) => Ok(ToSqlOutput::Owned(Value::Integer(*i))),
            FieldValue::Text(s) => s.to_sql(),
            FieldValue::Date(d) => d.to_sql(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}
