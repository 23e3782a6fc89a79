//! Route definitions for `/sub-topics`.
//!
//! Reads require authentication; writes require the admin role.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::sub_topic;
use crate::state::AppState;

/// Routes mounted at `/sub-topics`.
///
/// ```text
/// GET    /               -> list (`?topic_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while questions reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sub_topic::list).post(sub_topic::create))
        .route("/statistics", get(sub_topic::statistics))
        .route(
            "/{id}",
            get(sub_topic::get_by_id)
                .put(sub_topic::update)
                .delete(sub_topic::delete),
        )
        .route("/{id}/status", patch(sub_topic::set_status))
}
