//! Schema bootstrap - DDL generated from the entity descriptors
//!
//! Every statement is `CREATE TABLE IF NOT EXISTS`, so bootstrap is safe to
//! run on every startup. Tables are created in a fixed dependency order that
//! never references a not-yet-created table.

use rusqlite::Connection;

use crate::entity::{Entity, EntityDescriptor, FieldType};
use crate::{Error, Result};

/// Dependency order for table creation: referenced tables first.
pub fn bootstrap_order() -> [Entity; 5] {
    [
        Entity::Class,
        Entity::Course,
        Entity::Student,
        Entity::Teacher,
        Entity::Score,
    ]
}

fn sql_type(ty: FieldType) -> &'static str {
    match ty {
        FieldType::Integer => "INTEGER",
        // Dates travel as ISO-8601 text
        FieldType::Text | FieldType::Date => "TEXT",
    }
}

/// Render the CREATE TABLE statement for one entity.
pub fn create_table_sql(desc: &EntityDescriptor) -> String {
    let mut clauses: Vec<String> = Vec::new();

    for field in desc.fields {
        if desc.generated_key && desc.is_key(field.name) {
            // Store-assigned key, immutable after insert
            clauses.push(format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", field.name));
        } else {
            clauses.push(format!("{} {} NOT NULL", field.name, sql_type(field.ty)));
        }
    }

    if !desc.generated_key {
        clauses.push(format!("PRIMARY KEY ({})", desc.primary_key.join(", ")));
    }

    for fk in desc.foreign_keys {
        clauses.push(format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column,
            fk.references.descriptor().table,
            fk.target_column
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        desc.table,
        clauses.join(",\n    ")
    )
}

/// Idempotently create all five tables. Failure here is fatal at startup
/// and surfaces as a connection error.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    for entity in bootstrap_order() {
        let desc = entity.descriptor();
        conn.execute(&create_table_sql(desc), [])
            .map_err(|e| Error::Connection(format!("schema bootstrap ({}): {}", desc.table, e)))?;
    }
    Ok(())
}
