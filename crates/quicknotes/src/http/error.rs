//! Mapping from crate errors to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// An error ready to be rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// The request was understood but its content was rejected.
    BadRequest(String),
    /// The addressed note does not exist.
    NotFound(String),
    /// The request body could not be decoded.
    Rejection {
        /// Status reported to the client.
        status: StatusCode,
        /// Extractor message.
        message: String,
    },
    /// Something failed below the HTTP layer. Details are logged, not returned.
    Internal,
}

impl ApiError {
    /// The status code this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Rejection { status, .. } => *status,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn note_not_found(id: Option<i64>) -> Self {
        match id {
            Some(id) => Self::NotFound(format!("Note {id} not found.")),
            None => Self::NotFound("Note not found.".to_string()),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(reason) => Self::BadRequest(reason.to_string()),
            Error::NoteNotFound { id } => Self::note_not_found(Some(id)),
            other => {
                error!(error = %other, "Request failed");
                Self::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Wrongly typed fields are invalid input like any other
        let status = match &rejection {
            JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
            other => other.status(),
        };
        Self::Rejection {
            status,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message) | Self::NotFound(message) => message,
            Self::Rejection { message, .. } => message,
            Self::Internal => "Internal server error.".to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
