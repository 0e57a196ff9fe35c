//! `quicknotes` - a tiny notes service
//!
//! This library provides the pieces of a small JSON API over a single
//! `SQLite` table of short, immutable notes: validation, storage, the notes
//! service, and the axum router that exposes it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod note;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::{Note, NoteText, ValidationError, MAX_TEXT_CHARS};
pub use service::NoteService;
pub use storage::Storage;
