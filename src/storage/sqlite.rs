//! SQLite record store - descriptor-driven CRUD
//!
//! One generic implementation of list/insert/update/delete parameterized by
//! the entity descriptor. Statement text is assembled from descriptor column
//! names only; field values are always bound parameters, never interpolated.

use std::path::Path;

use rusqlite::{params_from_iter, Connection};

use super::schema;
use crate::entity::{Entity, Field, FieldType};
use crate::value::FieldValue;
use crate::{Error, Result};

/// SQLite-backed store for the five record tables.
///
/// Owns the single long-lived connection for the process; the connection is
/// released when the store is dropped. Operations are synchronous and each
/// statement commits on its own (autocommit) - there is no multi-statement
/// transaction spanning entities.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open a database file (creates if it doesn't exist) and bootstrap the
    /// schema. Failure here is fatal to startup.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::Connection(e.to_string()))?;
        Self::bootstrap(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Connection(e.to_string()))?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        // SQLite ships with foreign-key enforcement off
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| Error::Connection(e.to_string()))?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Full-table read in primary-key order. An empty table yields an empty
    /// vec, never an error. Rows come back in descriptor column order.
    pub fn list(&self, entity: Entity) -> Result<Vec<Vec<FieldValue>>> {
        let desc = entity.descriptor();
        let columns: Vec<&str> = desc.column_names().collect();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            columns.join(", "),
            desc.table,
            desc.primary_key.join(", ")
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| classify(entity, "list", e))?;

        let rows = stmt
            .query_map([], |row| {
                desc.fields
                    .iter()
                    .enumerate()
                    .map(|(idx, field)| read_cell(row, idx, field.ty))
                    .collect::<rusqlite::Result<Vec<FieldValue>>>()
            })
            .map_err(|e| classify(entity, "list", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| classify(entity, "list", e))?;

        Ok(rows)
    }

    /// Write a new row. `values` covers the insert columns (store-assigned
    /// keys are omitted); returns the assigned rowid for generated-key
    /// entities, `None` otherwise.
    pub fn insert(&self, entity: Entity, values: &[FieldValue]) -> Result<Option<i64>> {
        let desc = entity.descriptor();
        let fields = desc.insert_fields();
        check_shape(entity, fields, values)?;

        let columns: Vec<&str> = fields.iter().map(|f| f.name).collect();
        let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            desc.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        self.conn
            .execute(&sql, params_from_iter(values.iter()))
            .map_err(|e| classify(entity, "insert", e))?;

        Ok(desc
            .generated_key
            .then(|| self.conn.last_insert_rowid()))
    }

    /// Rewrite the non-key columns of an existing row. `row` is a full row
    /// (primary key included, descriptor order) as produced by
    /// [`crate::parser::parse_row`]; the key columns form the WHERE clause
    /// and are never rewritten. Zero rows affected is [`Error::NotFound`].
    pub fn update(&self, entity: Entity, row: &[FieldValue]) -> Result<()> {
        let desc = entity.descriptor();
        check_shape(entity, desc.fields, row)?;

        let set_fields: Vec<&Field> = desc.non_key_fields().collect();
        let key_fields: Vec<&Field> = desc.key_fields().collect();

        let mut idx = 0usize;
        let set_clause: Vec<String> = set_fields
            .iter()
            .map(|f| {
                idx += 1;
                format!("{} = ?{}", f.name, idx)
            })
            .collect();
        let where_clause: Vec<String> = key_fields
            .iter()
            .map(|f| {
                idx += 1;
                format!("{} = ?{}", f.name, idx)
            })
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            desc.table,
            set_clause.join(", "),
            where_clause.join(" AND ")
        );

        // Bind set values first, then key values, matching placeholder order
        let mut params: Vec<&FieldValue> = Vec::with_capacity(row.len());
        for (field, value) in desc.fields.iter().zip(row) {
            if !desc.is_key(field.name) {
                params.push(value);
            }
        }
        for (field, value) in desc.fields.iter().zip(row) {
            if desc.is_key(field.name) {
                params.push(value);
            }
        }

        let affected = self
            .conn
            .execute(&sql, params_from_iter(params))
            .map_err(|e| classify(entity, "update", e))?;

        if affected == 0 {
            return Err(Error::NotFound {
                entity,
                operation: "update",
            });
        }
        Ok(())
    }

    /// Remove a row by primary key. `keys` holds exactly the key values in
    /// descriptor order (one for single-key entities, two for Score). A row
    /// still referenced elsewhere fails with [`Error::Constraint`].
    pub fn delete(&self, entity: Entity, keys: &[FieldValue]) -> Result<()> {
        let desc = entity.descriptor();
        let key_fields: Vec<&Field> = desc.key_fields().collect();
        if keys.len() != key_fields.len() {
            return Err(Error::Format {
                entity,
                message: format!(
                    "expected {} key value(s), got {}",
                    key_fields.len(),
                    keys.len()
                ),
            });
        }
        for (field, value) in key_fields.iter().copied().zip(keys) {
            check_cell(entity, field, value)?;
        }

        let where_clause: Vec<String> = key_fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} = ?{}", f.name, i + 1))
            .collect();
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            desc.table,
            where_clause.join(" AND ")
        );

        let affected = self
            .conn
            .execute(&sql, params_from_iter(keys.iter()))
            .map_err(|e| classify(entity, "delete", e))?;

        if affected == 0 {
            return Err(Error::NotFound {
                entity,
                operation: "delete",
            });
        }
        Ok(())
    }
}

fn read_cell(row: &rusqlite::Row, idx: usize, ty: FieldType) -> rusqlite::Result<FieldValue> {
    match ty {
        FieldType::Integer => row.get(idx).map(FieldValue::Integer),
        FieldType::Text => row.get(idx).map(FieldValue::Text),
        FieldType::Date => row.get(idx).map(FieldValue::Date),
    }
}

/// Reject a value vector whose count or types disagree with the descriptor
/// before any statement is built.
fn check_shape(entity: Entity, fields: &[Field], values: &[FieldValue]) -> Result<()> {
    if values.len() != fields.len() {
        return Err(Error::Format {
            entity,
            message: format!("expected {} fields, got {}", fields.len(), values.len()),
        });
    }
    for (field, value) in fields.iter().zip(values) {
        check_cell(entity, field, value)?;
    }
    Ok(())
}

fn check_cell(entity: Entity, field: &Field, value: &FieldValue) -> Result<()> {
    if value.field_type() != field.ty {
        return Err(Error::Format {
            entity,
            message: format!(
                "{}: expected {:?}, got {:?}",
                field.name,
                field.ty,
                value.field_type()
            ),
        });
    }
    Ok(())
}

/// Map a rusqlite failure into the error taxonomy: constraint violations
/// (foreign key, uniqueness, primary key) are recoverable and reported as
/// such; anything else is an unexpected storage failure.
fn classify(entity: Entity, operation: &'static str, e: rusqlite::Error) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(code, message)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Constraint {
                entity,
                operation,
                message: message.clone().unwrap_or_else(|| code.to_string()),
            }
        }
        _ => Error::Storage {
            entity,
            operation,
            source: e,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn int(i: i64) -> FieldValue {
        FieldValue::Integer(i)
    }

    fn date(y: i32, m: u32, d: u32) -> FieldValue {
        FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn store() -> RecordStore {
        RecordStore::open_in_memory().unwrap()
    }

    fn add_class(store: &RecordStore, name: &str) {
        store
            .insert(Entity::Class, &[text(name), text("Ms Wu"), text("Math")])
            .unwrap();
    }

    fn add_course(store: &RecordStore, id: i64, name: &str) {
        store
            .insert(Entity::Course, &[int(id), text(name), int(3)])
            .unwrap();
    }

    fn add_student(store: &RecordStore, name: &str, class: &str) -> i64 {
        store
            .insert(
                Entity::Student,
                &[text(name), text("F"), date(2008, 5, 1), text(class)],
            )
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_list_empty_table() {
        let store = store();
        assert!(store.list(Entity::Student).unwrap().is_empty());
    }

    #[test]
    fn test_student_insert_requires_existing_class() {
        let store = store();
        let err = store
            .insert(
                Entity::Student,
                &[text("Alice"), text("F"), date(2008, 5, 1), text("Class1A")],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));

        add_class(&store, "Class1A");
        let id = add_student(&store, "Alice", "Class1A");
        assert!(id > 0);
    }

    #[test]
    fn test_student_ids_are_unique() {
        let store = store();
        add_class(&store, "Class1A");
        let a = add_student(&store, "Alice", "Class1A");
        let b = add_student(&store, "Bob", "Class1A");
        assert_ne!(a, b);
    }

    #[test]
    fn test_list_after_insert_round_trips_fields() {
        let store = store();
        add_class(&store, "Class1A");
        let id = add_student(&store, "Alice", "Class1A");

        let rows = store.list(Entity::Student).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            vec![
                int(id),
                text("Alice"),
                text("F"),
                date(2008, 5, 1),
                text("Class1A"),
            ]
        );
    }

    #[test]
    fn test_insert_wrong_field_count() {
        let store = store();
        let err = store
            .insert(Entity::Class, &[text("Class1A")])
            .unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_insert_wrong_field_type() {
        let store = store();
        let err = store
            .insert(Entity::Course, &[text("101"), text("Math"), int(3)])
            .unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_update_nonexistent_key_is_not_found() {
        let store = store();
        add_class(&store, "Class1A");
        let row = vec![
            int(999),
            text("Ghost"),
            text("F"),
            date(2008, 5, 1),
            text("Class1A"),
        ];
        let err = store.update(Entity::Student, &row).unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                operation: "update",
                ..
            }
        ));
    }

    #[test]
    fn test_update_rewrites_non_key_columns() {
        let store = store();
        add_class(&store, "Class1A");
        let id = add_student(&store, "Alice", "Class1A");

        let row = vec![
            int(id),
            text("Alice Chen"),
            text("F"),
            date(2008, 5, 1),
            text("Class1A"),
        ];
        store.update(Entity::Student, &row).unwrap();

        let rows = store.list(Entity::Student).unwrap();
        assert_eq!(rows[0][1], text("Alice Chen"));
        assert_eq!(rows[0][0], int(id));
    }

    #[test]
    fn test_update_with_same_values_is_idempotent() {
        let store = store();
        add_class(&store, "Class1A");
        add_student(&store, "Alice", "Class1A");

        let before = store.list(Entity::Student).unwrap();
        store.update(Entity::Student, &before[0]).unwrap();
        assert_eq!(store.list(Entity::Student).unwrap(), before);
    }

    #[test]
    fn test_delete_referenced_class_fails_until_student_removed() {
        let store = store();
        add_class(&store, "Class1A");
        let id = add_student(&store, "Alice", "Class1A");

        let err = store
            .delete(Entity::Class, &[text("Class1A")])
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));

        store.delete(Entity::Student, &[int(id)]).unwrap();
        store.delete(Entity::Class, &[text("Class1A")]).unwrap();
        assert!(store.list(Entity::Class).unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_row_is_not_found() {
        let store = store();
        let err = store
            .delete(Entity::Course, &[int(404)])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                operation: "delete",
                ..
            }
        ));
    }

    #[test]
    fn test_delete_wrong_key_arity() {
        let store = store();
        let err = store.delete(Entity::Score, &[int(1)]).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_duplicate_score_pair_rejected() {
        let store = store();
        add_class(&store, "Class1A");
        add_course(&store, 101, "Math");
        let id = add_student(&store, "Alice", "Class1A");

        store
            .insert(Entity::Score, &[int(id), int(101), int(88), int(92)])
            .unwrap();
        let err = store
            .insert(Entity::Score, &[int(id), int(101), int(70), int(75)])
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));
    }

    #[test]
    fn test_score_requires_student_and_course() {
        let store = store();
        let err = store
            .insert(Entity::Score, &[int(1), int(101), int(88), int(92)])
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));
    }

    #[test]
    fn test_teacher_foreign_keys() {
        let store = store();
        add_class(&store, "Class1A");
        let err = store
            .insert(
                Entity::Teacher,
                &[int(1), text("Mr Li"), int(101), text("Class1A")],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));

        add_course(&store, 101, "Math");
        store
            .insert(
                Entity::Teacher,
                &[int(1), text("Mr Li"), int(101), text("Class1A")],
            )
            .unwrap();
    }

    #[test]
    fn test_list_orders_by_primary_key() {
        let store = store();
        add_course(&store, 20, "Physics");
        add_course(&store, 5, "Math");
        add_course(&store, 12, "History");

        let ids: Vec<FieldValue> = store
            .list(Entity::Course)
            .unwrap()
            .into_iter()
            .map(|row| row[0].clone())
            .collect();
        assert_eq!(ids, vec![int(5), int(12), int(20)]);
    }

    #[test]
    fn test_parse_row_then_update_is_a_no_op() {
        let store = store();
        add_class(&store, "Class1A");
        add_student(&store, "Alice", "Class1A");

        let before = store.list(Entity::Student).unwrap();
        let cells: Vec<String> = before[0].iter().map(|v| v.to_string()).collect();
        let row = crate::parser::parse_row(Entity::Student, &cells).unwrap();
        store.update(Entity::Student, &row).unwrap();
        assert_eq!(store.list(Entity::Student).unwrap(), before);
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("school.db");

        {
            let store = RecordStore::open(&path).unwrap();
            add_class(&store, "Class1A");
        }

        let store = RecordStore::open(&path).unwrap();
        let rows = store.list(Entity::Class).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], text("Class1A"));
    }
}
