//! `SQLite` schema definitions for quicknotes.
//!
//! This module contains the SQL statements for creating the database schema.

/// SQL statement to create the notes table.
///
/// `AUTOINCREMENT` keeps ids monotonic and prevents reuse of ids that
/// belonged to deleted notes.
pub const CREATE_NOTES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    created_utc TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_NOTES_TABLE, CREATE_METADATA_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_notes_table_columns() {
        assert!(CREATE_NOTES_TABLE.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(CREATE_NOTES_TABLE.contains("text TEXT NOT NULL"));
        assert!(CREATE_NOTES_TABLE.contains("created_utc TEXT NOT NULL"));
    }
}
