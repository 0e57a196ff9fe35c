//! Core note types for quicknotes.
//!
//! A note is a short, immutable piece of text with a store-assigned id and a
//! creation timestamp. Text is trimmed and length-checked before it is ever
//! handed to the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a note after trimming, counted in UTF-16 code units.
///
/// This matches how a browser enforces `maxlength`, so a character outside
/// the Basic Multilingual Plane (most emoji) counts as two.
pub const MAX_TEXT_CHARS: usize = 120;

/// Reasons a note text is rejected.
///
/// The display strings are part of the HTTP contract and are returned
/// verbatim in `{"error": ...}` bodies.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The text is empty once surrounding whitespace is removed.
    #[error("Text is required.")]
    Empty,
    /// The trimmed text is longer than [`MAX_TEXT_CHARS`].
    #[error("Max 120 chars.")]
    TooLong,
}

/// Note text that has been trimmed and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText(String);

impl NoteText {
    /// Trim `raw` and check it against the length limits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if nothing is left after trimming
    /// and [`ValidationError::TooLong`] if more than [`MAX_TEXT_CHARS`]
    /// UTF-16 code units remain.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        if trimmed.encode_utf16().count() > MAX_TEXT_CHARS {
            return Err(ValidationError::TooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the validated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NoteText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A persisted note.
///
/// Serializes with the field names used by the JSON API
/// (`id`, `text`, `createdUtc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Store-assigned identifier, unique and never reused.
    pub id: i64,
    /// The trimmed note text.
    pub text: String,
    /// When the note was created.
    pub created_utc: DateTime<Utc>,
}
