//! Route definitions for `/permissions`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::permission;
use crate::state::AppState;

/// Routes mounted at `/permissions`.
///
/// ```text
/// GET    /               -> list (`?menu_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while roles hold it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(permission::list).post(permission::create))
        .route("/statistics", get(permission::statistics))
        .route(
            "/{id}",
            get(permission::get_by_id)
                .put(permission::update)
                .delete(permission::delete),
        )
        .route("/{id}/status", patch(permission::set_status))
}
