//! Upload page and upload handling
//!
//! GET / renders the upload form with the recent-files listing; POST /
//! accepts a multipart PDF upload and redirects to its viewer. Validation
//! failures re-render the upload page with a flash message and a 4xx status.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage::RECENT_LIMIT;
use crate::templates;

/// Create the index router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index).post(upload))
}

/// GET /
async fn index(State(state): State<AppState>) -> Html<String> {
    let recent = state.library().recent(RECENT_LIMIT).await;
    Html(templates::upload_page(&recent, None))
}

/// POST /
///
/// Expects a multipart body with a `file` field holding the PDF.
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Ok(rejection(&state, "No file selected").await);
    };
    if file_name.is_empty() || bytes.is_empty() {
        return Ok(rejection(&state, "No file selected").await);
    }

    match state.library().store(&file_name, &bytes).await {
        Ok(stored_name) => {
            let target = format!("/view/{}", urlencoding::encode(&stored_name));
            Ok(Redirect::to(&target).into_response())
        }
        Err(AppError::BadRequest(msg)) => Ok(rejection(&state, &msg).await),
        Err(e) => Err(e),
    }
}

/// Render the upload page with a flash message and a 400 status.
async fn rejection(state: &AppState, message: &str) -> Response {
    tracing::debug!("Rejected upload: {}", message);
    let recent = state.library().recent(RECENT_LIMIT).await;
    (
        StatusCode::BAD_REQUEST,
        Html(templates::upload_page(&recent, Some(message))),
    )
        .into_response()
}
