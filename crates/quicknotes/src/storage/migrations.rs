//! Schema bootstrapping for quicknotes.
//!
//! Creates the tables on first open and stamps the schema version into the
//! `metadata` table. A database written by a newer schema is refused rather
//! than guessed at.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The schema version this build reads and writes.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Initialize the database schema.
///
/// Safe to call on every open: tables are created only if missing and the
/// version stamp is written only on a fresh database.
///
/// # Errors
///
/// Returns an error if schema creation fails or the database carries a
/// schema version this build does not understand.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match schema_version(conn)? {
        None => {
            debug!("Stamping fresh database with schema version {CURRENT_VERSION}");
            set_schema_version(conn, CURRENT_VERSION)
        }
        Some(version) if version == CURRENT_VERSION => Ok(()),
        Some(version) => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is not supported (expected {CURRENT_VERSION})"
            ),
        }),
    }
}

/// Read the schema version, or `None` for a database that was never stamped.
pub(crate) fn schema_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|value| {
            value.parse().map_err(|_| Error::DatabaseMigration {
                message: format!("invalid schema version: {value}"),
            })
        })
        .transpose()
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
