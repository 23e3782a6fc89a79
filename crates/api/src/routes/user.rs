//! Route definitions for `/users`. All endpoints require the admin role.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /statistics              -> statistics
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// PATCH  /{id}/status             -> set_status
/// DELETE /{id}                    -> delete
/// PUT    /{id}/roles              -> set_roles
/// POST   /{id}/reset-password     -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list).post(user::create))
        .route("/statistics", get(user::statistics))
        .route(
            "/{id}",
            get(user::get_by_id).put(user::update).delete(user::delete),
        )
        .route("/{id}/status", patch(user::set_status))
        .route("/{id}/roles", put(user::set_roles))
        .route("/{id}/reset-password", post(user::reset_password))
}
