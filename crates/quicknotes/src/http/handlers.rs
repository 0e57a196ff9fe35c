//! Request handlers for the notes API.
//!
//! Handlers only translate between HTTP and [`NoteService`]; trimming and
//! validation live in the service. Store calls run on the blocking pool.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::error::{Error, Result};
use crate::note::Note;
use crate::service::NoteService;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Server time when the request was handled.
    pub time: DateTime<Utc>,
}

/// Body of `POST /api/notes`.
///
/// A missing or `null` `text` is treated as empty text.
#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    /// Raw note text, trimmed by the service.
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of a successful `POST /api/notes`.
#[derive(Debug, Serialize)]
pub struct CreatedNote {
    /// Id of the new note.
    pub id: i64,
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: Utc::now(),
    })
}

pub(super) async fn list_notes(
    State(service): State<NoteService>,
) -> std::result::Result<Json<Vec<Note>>, ApiError> {
    let notes = run_blocking(move || service.list()).await?;
    Ok(Json(notes))
}

pub(super) async fn create_note(
    State(service): State<NoteService>,
    payload: std::result::Result<Json<CreateNoteRequest>, JsonRejection>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let text = request.text.unwrap_or_default();

    let id = run_blocking(move || service.create(&text)).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/notes/{id}"))],
        Json(CreatedNote { id }),
    ))
}

pub(super) async fn delete_note(
    State(service): State<NoteService>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> std::result::Result<StatusCode, ApiError> {
    // Anything that is not an integer cannot name a note
    let Ok(Path(id)) = id else {
        return Err(ApiError::note_not_found(None));
    };

    run_blocking(move || service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?;
    Ok(result?)
}
