//! Storage layer for quicknotes.
//!
//! This module provides `SQLite`-based persistent storage for notes. Every
//! method maps to exactly one SQL statement; there is no caching and no
//! multi-statement transaction.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::note::{Note, NoteText};

/// Storage engine for notes.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets the frontend's list reads proceed while a write is in flight
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a note and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, text: &NoteText, created_utc: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO notes (text, created_utc) VALUES (?1, ?2)",
            params![
                text.as_str(),
                created_utc.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted note with id {}", id);
        Ok(id)
    }

    /// Get a note by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                "SELECT id, text, created_utc FROM notes WHERE id = ?1",
                [id],
                Self::row_to_note,
            )
            .optional()?;
        Ok(note)
    }

    /// List every note, newest id first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, created_utc FROM notes ORDER BY id DESC")?;

        let notes = stmt
            .query_map([], Self::row_to_note)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Count total notes in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a note by ID.
    ///
    /// Returns `true` if a note was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!("Deleted note with id {}", id);
        }
        Ok(affected > 0)
    }

    fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        let id: i64 = row.get(0)?;
        let text: String = row.get(1)?;
        let created_str: String = row.get(2)?;

        let created_utc = DateTime::parse_from_rfc3339(&created_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);

        Ok(Note {
            id,
            text,
            created_utc,
        })
    }
}
