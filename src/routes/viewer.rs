//! Viewer page route
//!
//! Serves the PDF.js viewer for a stored file. Existence is deliberately not
//! checked here: a missing file shows up as a load error in the viewer.

use axum::{
    extract::Path,
    response::Html,
    routing::get,
    Router,
};

use crate::state::AppState;
use crate::storage;
use crate::templates;

/// Create the viewer router
pub fn router() -> Router<AppState> {
    Router::new().route("/view/:filename", get(view_pdf))
}

/// GET /view/{filename}
async fn view_pdf(Path(filename): Path<String>) -> Html<String> {
    let display = storage::display_name(&filename);
    Html(templates::viewer_page(&filename, &display))
}
