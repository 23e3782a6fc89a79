//! Route definitions for `/performance-statistics`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::performance_statistic as stats;
use crate::state::AppState;

/// Routes mounted at `/performance-statistics`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> submit (insert or overwrite)
/// POST   /bulk           -> bulk_submit
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stats::list).post(stats::submit))
        .route("/bulk", post(stats::bulk_submit))
        .route("/statistics", get(stats::statistics))
        .route(
            "/{id}",
            get(stats::get_by_id).put(stats::update).delete(stats::delete),
        )
}
