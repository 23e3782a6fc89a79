//! Route definitions for `/ranges`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::range;
use crate::state::AppState;

/// Routes mounted at `/ranges`.
///
/// ```text
/// GET    /               -> list (`?district_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while battalions reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(range::list).post(range::create))
        .route("/statistics", get(range::statistics))
        .route(
            "/{id}",
            get(range::get_by_id)
                .put(range::update)
                .delete(range::delete),
        )
        .route("/{id}/status", patch(range::set_status))
}
