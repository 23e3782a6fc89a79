//! Route definitions for `/reports`.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// ```text
/// GET /          -> generate (?report_type=summary|detailed|geographic|trend|submission)
/// GET /types     -> types
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report::generate))
        .route("/types", get(report::types))
}
