//! Route definitions for `/topics`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::topic;
use crate::state::AppState;

/// Routes mounted at `/topics`.
///
/// ```text
/// GET    /               -> list (`?module_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while sub-topics or questions reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(topic::list).post(topic::create))
        .route("/statistics", get(topic::statistics))
        .route(
            "/{id}",
            get(topic::get_by_id)
                .put(topic::update)
                .delete(topic::delete),
        )
        .route("/{id}/status", patch(topic::set_status))
}
