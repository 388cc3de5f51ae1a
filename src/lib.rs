//! Folio Server Library
//!
//! A self-hosted PDF viewer: upload a PDF, read it in the browser with
//! pan/zoom and a selectable text layer (rendered client-side by PDF.js),
//! and ask an external completion API about its content.
//!
//! # Modules
//!
//! - `storage`: flat-directory PDF storage with sanitized names
//! - `templates`: pure HTML generation for the upload and viewer pages
//! - `chat`: prompt assembly and the completion-provider seam
//! - `routes`: one HTTP surface per file

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod chat;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod storage;
pub mod templates;

use state::AppState;

/// Multipart framing headroom on top of the configured upload maximum.
const BODY_LIMIT_OVERHEAD: u64 = 1024 * 1024;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config().storage.max_upload_bytes + BODY_LIMIT_OVERHEAD;

    Router::new()
        .merge(routes::index::router())
        .merge(routes::viewer::router())
        .merge(routes::files::router())
        .merge(routes::chat::router())
        .merge(routes::health::router())
        .layer(DefaultBodyLimit::max(body_limit as usize))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
