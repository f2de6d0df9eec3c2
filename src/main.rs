//! Registrar CLI - command-line front end for the school records core

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use registrar::config;
use registrar::parser;
use registrar::storage::RecordStore;
use registrar::ui;
use registrar::{Entity, Error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "registrar")]
#[command(version)]
#[command(about = "School records manager - Student/Class/Teacher/Course/Score over SQLite")]
#[command(long_about = r#"
Registrar manages five school record types in a single SQLite database,
one row at a time:

  registrar entities
  registrar list student
  registrar add class "Class1A, Ms Wu, Math"
  registrar add student "Alice, F, 2008-05-01, Class1A"
  registrar update student "1, Alice Chen, F, 2008-05-01, Class1A"
  registrar delete score 1 101

Input lines are comma-separated values in the entity's column order;
store-assigned keys (StudentID) are omitted on add.
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides registrar.toml)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the five entity types in their fixed order
    Entities,

    /// Show all rows of an entity
    List {
        /// Entity type (student, class, teacher, course, score)
        entity: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Add one row from a comma-separated input line
    Add {
        /// Entity type
        entity: String,

        /// Field values, comma-separated, in column order (generated keys omitted)
        line: String,
    },

    /// Update one row; takes the full row as rendered by `list`, key included
    Update {
        /// Entity type
        entity: String,

        /// Full row, comma-separated, in column order
        row: String,
    },

    /// Delete one row by primary key
    Delete {
        /// Entity type
        entity: String,

        /// Primary key value(s): one, or two for score (StudentID CourseID)
        keys: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let loaded = config::load_config(cli.config.as_deref())?;
    let db_path = config::resolve_database_path(cli.database, loaded.as_ref());

    match cli.command {
        Commands::Entities => {
            for entity in Entity::all() {
                println!("{}", entity);
            }
        }

        Commands::List { entity, format } => {
            let entity = Entity::from_str(&entity)?;
            let store = RecordStore::open(&db_path)?;
            let rows = store.list(entity)?;

            if format == "json" {
                println!("{}", rows_to_json(entity, &rows)?);
            } else {
                println!("{}", ui::render_rows(entity.descriptor(), &rows));
                println!("{} row(s)", rows.len());
            }
        }

        Commands::Add { entity, line } => {
            let entity = Entity::from_str(&entity)?;
            let store = RecordStore::open(&db_path)?;

            let values = parser::parse_create(entity, &line)?;
            match store.insert(entity, &values)? {
                Some(id) => tracing::info!("{} added with id {}", entity, id),
                None => tracing::info!("{} added", entity),
            }
            println!("{}", ui::render_rows(entity.descriptor(), &store.list(entity)?));
        }

        Commands::Update { entity, row } => {
            let entity = Entity::from_str(&entity)?;
            let store = RecordStore::open(&db_path)?;

            let cells: Vec<String> = row.split(',').map(|c| c.trim().to_string()).collect();
            let values = parser::parse_row(entity, &cells)?;
            match store.update(entity, &values) {
                Ok(()) => tracing::info!("{} updated", entity),
                Err(Error::NotFound { .. }) => {
                    tracing::warn!("{}: no row matches that key, nothing updated", entity)
                }
                Err(e) => return Err(e.into()),
            }
            println!("{}", ui::render_rows(entity.descriptor(), &store.list(entity)?));
        }

        Commands::Delete { entity, keys } => {
            let entity = Entity::from_str(&entity)?;
            let store = RecordStore::open(&db_path)?;

            let key_values = parser::parse_key(entity, &keys)?;
            match store.delete(entity, &key_values) {
                Ok(()) => tracing::info!("{} deleted", entity),
                Err(Error::NotFound { .. }) => {
                    tracing::warn!("{}: no row matches that key, nothing deleted", entity)
                }
                Err(e) => return Err(e.into()),
            }
            println!("{}", ui::render_rows(entity.descriptor(), &store.list(entity)?));
        }
    }

    Ok(())
}

fn rows_to_json(
    entity: Entity,
    rows: &[Vec<registrar::FieldValue>],
) -> anyhow::Result<String> {
    let desc = entity.descriptor();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut obj = serde_json::Map::new();
        for (name, value) in desc.column_names().zip(row) {
            obj.insert(name.to_string(), serde_json::to_value(value)?);
        }
        out.push(serde_json::Value::Object(obj));
    }
    Ok(serde_json::to_string_pretty(&out)?)
}
