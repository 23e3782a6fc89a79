//! Route definitions for `/battalions`.
//!
//! Reads require authentication; writes require the admin role.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::battalion;
use crate::state::AppState;

/// Routes mounted at `/battalions`.
///
/// ```text
/// GET    /               -> list (`?range_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while statistics or users reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(battalion::list).post(battalion::create))
        .route("/statistics", get(battalion::statistics))
        .route(
            "/{id}",
            get(battalion::get_by_id)
                .put(battalion::update)
                .delete(battalion::delete),
        )
        .route("/{id}/status", patch(battalion::set_status))
}
