//! # Registrar - School Records Manager
//!
//! Five-entity relational CRUD over SQLite for a school records domain.
//!
//! Registrar provides:
//! - A static entity registry describing Student, Class, Teacher, Course, Score
//! - Idempotent schema bootstrap with foreign-key constraints
//! - Descriptor-driven List/Insert/Update/Delete with bound parameters
//! - A parser turning delimited text lines into typed field values

pub mod config;
pub mod entity;
pub mod parser;
pub mod storage;
pub mod ui;
pub mod value;

// Re-exports for convenient access
pub use entity::{Entity, EntityDescriptor, Field, FieldType, ForeignKey};
pub use storage::RecordStore;
pub use value::FieldValue;

/// Result type alias for registrar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for registrar operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store unreachable or schema bootstrap failed; fatal at startup.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Entity name outside the fixed set of five.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// User input could not be parsed into the entity's typed fields.
    #[error("{entity}: malformed input: {message}")]
    Format { entity: Entity, message: String },

    /// The store rejected the operation over a foreign-key or uniqueness rule.
    #[error("{entity} {operation}: constraint violated: {message}")]
    Constraint {
        entity: Entity,
        operation: &'static str,
        message: String,
    },

    /// Update or delete matched zero rows; reportable, not fatal.
    #[error("{entity} {operation}: no matching row")]
    NotFound {
        entity: Entity,
        operation: &'static str,
    },

    /// Unexpected database failure outside the constraint taxonomy.
    #[error("{entity} {operation}: storage error: {source}")]
    Storage {
        entity: Entity,
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}
