//! HTTP layer for quicknotes.
//!
//! Builds the axum [`Router`] for the JSON API, the landing page and the
//! optional static frontend, and runs it until a shutdown signal arrives.
//!
//! | Method   | Path              | Success                    |
//! |----------|-------------------|----------------------------|
//! | `GET`    | `/`               | 200, HTML landing page     |
//! | `GET`    | `/api/health`     | 200, `{status, time}`      |
//! | `GET`    | `/api/notes`      | 200, notes newest first    |
//! | `POST`   | `/api/notes`      | 201, `{id}` + `Location`   |
//! | `DELETE` | `/api/notes/{id}` | 204                        |

pub mod error;
pub mod handlers;

use axum::http::HeaderValue;
use axum::response::Html;
use axum::routing::{delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::service::NoteService;

pub use error::ApiError;

/// Mount point of the static frontend.
pub const FRONTEND_PATH: &str = "/notes";

const LANDING_TEMPLATE: &str = include_str!("landing.html");

/// Build the application router.
///
/// # Errors
///
/// Returns an error if an allowed origin is not a valid header value.
pub fn router(service: NoteService, config: &ServerConfig) -> Result<Router> {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route("/notes/:id", delete(handlers::delete_note));

    let landing = landing_page(config.frontend_dir.is_some());
    let mut app = Router::new()
        .route(
            "/",
            get(move || {
                let page = landing.clone();
                async move { Html(page) }
            }),
        )
        .nest("/api", api);

    if let Some(dir) = &config.frontend_dir {
        info!("Serving frontend from {} at {FRONTEND_PATH}/", dir.display());
        app = app.nest_service(FRONTEND_PATH, ServeDir::new(dir));
    }

    Ok(app
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins)?)
        .with_state(service))
}

/// Serve `app` on `listener` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Only the configured origins may call the API from a browser, with any
/// method and any header.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .ok()
                .filter(|value| value != "*")
                .ok_or_else(|| Error::config_validation(format!("invalid allowed origin: {origin}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

fn landing_page(with_frontend: bool) -> String {
    let frontend_link = if with_frontend {
        format!(r#"<a class="pill" href="{FRONTEND_PATH}/"><code>{FRONTEND_PATH}/</code></a>"#)
    } else {
        String::new()
    };

    LANDING_TEMPLATE
        .replace("{{frontend_link}}", &frontend_link)
        .replace("{{version}}", env!("CARGO_PKG_VERSION"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page_without_frontend() {
        let page = landing_page(false);
        assert!(page.contains("/api/health"));
        assert!(page.contains("/api/notes"));
        assert!(!page.contains("{{"));
        assert!(!page.contains(r#"href="/notes/""#));
    }

    #[test]
    fn test_landing_page_with_frontend() {
        let page = landing_page(true);
        assert!(page.contains(r#"href="/notes/""#));
        assert!(page.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let origins = vec![
            "https://megadev.se".to_string(),
            "http://localhost:5173".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_header_value() {
        let origins = vec!["https://bad\norigin".to_string()];
        assert!(cors_layer(&origins).is_err());

        let wildcard = vec!["*".to_string()];
        assert!(cors_layer(&wildcard).is_err());
    }
}
