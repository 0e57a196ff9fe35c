//! Notes service.
//!
//! The service is the only thing the HTTP layer and the CLI talk to. It owns
//! a shared handle to [`Storage`] and turns raw input into validated store
//! calls. There is deliberately no update operation: notes are immutable.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::note::{Note, NoteText};
use crate::storage::Storage;

/// Cloneable handle to the notes store.
///
/// Clones share the same underlying connection. The lock is held for the
/// duration of a single statement only.
#[derive(Debug, Clone)]
pub struct NoteService {
    storage: Arc<Mutex<Storage>>,
}

impl NoteService {
    /// Wrap an opened storage engine.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// All notes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn list(&self) -> Result<Vec<Note>> {
        self.storage()?.list()
    }

    /// Trim and validate `text`, then persist it as a new note.
    ///
    /// Returns the id assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty or over-long text, or a store
    /// error if the insert fails.
    pub fn create(&self, text: &str) -> Result<i64> {
        let text = NoteText::parse(text)?;
        let id = self.storage()?.insert(&text, Utc::now())?;
        info!(id, "Created note");
        Ok(id)
    }

    /// Delete the note with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteNotFound`] if no such note exists, or a store
    /// error if the delete fails.
    pub fn delete(&self, id: i64) -> Result<()> {
        if self.storage()?.delete(id)? {
            info!(id, "Deleted note");
            Ok(())
        } else {
            debug!(id, "Delete of unknown note");
            Err(Error::NoteNotFound { id })
        }
    }

    /// Look up a single note.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn get(&self, id: i64) -> Result<Option<Note>> {
        self.storage()?.get(id)
    }

    /// Number of stored notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn count(&self) -> Result<i64> {
        self.storage()?.count()
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration;

    use super::*;
    use crate::note::{ValidationError, MAX_TEXT_CHARS};

    fn create_test_service() -> NoteService {
        crate::logging::init_test_logging();
        NoteService::new(Storage::open_in_memory().expect("failed to create test storage"))
    }

    #[test]
    fn test_create_returns_unique_ids() {
        let service = create_test_service();
        let mut seen = HashSet::new();

        for i in 0..20 {
            let id = service.create(&format!("note {i}")).unwrap();
            assert!(seen.insert(id), "id {id} was issued twice");
        }
    }

    #[test]
    fn test_create_rejects_empty_text() {
        let service = create_test_service();

        for input in ["", "   "] {
            let err = service.create(input).unwrap_err();
            assert!(matches!(err, Error::Validation(ValidationError::Empty)));
        }
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_long_text() {
        let service = create_test_service();
        let input = format!(" {} ", "x".repeat(MAX_TEXT_CHARS + 1));

        let err = service.create(&input).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::TooLong)));
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_created_note_heads_the_list() {
        let service = create_test_service();
        service.create("older").unwrap();

        let before = Utc::now();
        let id = service.create("  buy milk  ").unwrap();

        let notes = service.list().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, id);
        assert_eq!(notes[0].text, "buy milk");
        assert!(notes[0].created_utc >= before - Duration::seconds(1));
        assert!(notes[0].created_utc <= Utc::now() + Duration::seconds(1));
    }

    #[test]
    fn test_delete_then_delete_again() {
        let service = create_test_service();
        let id = service.create("short lived").unwrap();

        service.delete(id).unwrap();
        assert!(service.list().unwrap().iter().all(|n| n.id != id));

        let err = service.delete(id).unwrap_err();
        assert!(matches!(err, Error::NoteNotFound { id: missing } if missing == id));
    }

    #[test]
    fn test_delete_unknown_id_leaves_store_untouched() {
        let service = create_test_service();
        service.create("stays").unwrap();
        let before = service.list().unwrap();

        assert!(service.delete(4242).unwrap_err().is_not_found());
        assert_eq!(service.list().unwrap(), before);
    }

    #[test]
    fn test_get() {
        let service = create_test_service();
        let id = service.create("findable").unwrap();

        assert_eq!(service.get(id).unwrap().unwrap().text, "findable");
        assert!(service.get(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let service = create_test_service();
        let clone = service.clone();

        let id = clone.create("shared").unwrap();
        assert_eq!(service.get(id).unwrap().unwrap().text, "shared");
    }

    #[test]
    fn test_concurrent_creates() {
        let service = create_test_service();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let service = service.clone();
                std::thread::spawn(move || {
                    (0..10)
                        .map(|i| service.create(&format!("t{t} n{i}")).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(ids.len(), 80);
        assert_eq!(service.count().unwrap(), 80);
    }
}
