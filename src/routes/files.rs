//! PDF file serving
//!
//! Streams stored PDF bytes back to the viewer. The requested name goes
//! through the same sanitization as uploads, so traversal attempts resolve
//! to not-found instead of escaping the storage directory.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage;

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new().route("/pdf/:filename", get(serve_pdf))
}

/// GET /pdf/{filename}
async fn serve_pdf(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let bytes = state.library().read(&filename).await?;

    tracing::debug!(file = %filename, size = bytes.len(), "Serving PDF");

    let display = storage::display_name(&filename);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", display),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}
