//! Route definitions for `/questions`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::question;
use crate::state::AppState;

/// Routes mounted at `/questions`.
///
/// ```text
/// GET    /               -> list (`?module_id=&topic_id=&sub_topic_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused once statistics answer it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(question::list).post(question::create))
        .route("/statistics", get(question::statistics))
        .route(
            "/{id}",
            get(question::get_by_id)
                .put(question::update)
                .delete(question::delete),
        )
        .route("/{id}/status", patch(question::set_status))
}
