//! Route definitions for `/districts`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::district;
use crate::state::AppState;

/// Routes mounted at `/districts`.
///
/// ```text
/// GET    /               -> list (`?state_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while ranges reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(district::list).post(district::create))
        .route("/statistics", get(district::statistics))
        .route(
            "/{id}",
            get(district::get_by_id)
                .put(district::update)
                .delete(district::delete),
        )
        .route("/{id}/status", patch(district::set_status))
}
