//! Route definitions for `/states`.
//!
//! Reads require authentication; writes require the admin role.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::state as states;
use crate::state::AppState;

/// Routes mounted at `/states`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while districts reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(states::list).post(states::create))
        .route("/statistics", get(states::statistics))
        .route(
            "/{id}",
            get(states::get_by_id)
                .put(states::update)
                .delete(states::delete),
        )
        .route("/{id}/status", patch(states::set_status))
}
