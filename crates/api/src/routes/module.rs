//! Route definitions for `/modules`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::module;
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while topics reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(module::list).post(module::create))
        .route("/statistics", get(module::statistics))
        .route(
            "/{id}",
            get(module::get_by_id)
                .put(module::update)
                .delete(module::delete),
        )
        .route("/{id}/status", patch(module::set_status))
}
