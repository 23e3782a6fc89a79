//! Route definitions for `/roles`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

/// Routes mounted at `/roles`. Everything except reads is admin-only.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /statistics          -> statistics
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// PATCH  /{id}/status         -> set_status
/// DELETE /{id}                -> delete
/// GET    /{id}/permissions    -> get_permissions
/// PUT    /{id}/permissions    -> set_permissions (replaces the whole set)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(role::list).post(role::create))
        .route("/statistics", get(role::statistics))
        .route(
            "/{id}",
            get(role::get_by_id).put(role::update).delete(role::delete),
        )
        .route("/{id}/status", patch(role::set_status))
        .route(
            "/{id}/permissions",
            get(role::get_permissions).put(role::set_permissions),
        )
}
