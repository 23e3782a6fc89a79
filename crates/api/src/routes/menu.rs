//! Route definitions for `/menus`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::menu;
use crate::state::AppState;

/// Routes mounted at `/menus`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while sub-menus or permissions reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::list).post(menu::create))
        .route("/statistics", get(menu::statistics))
        .route(
            "/{id}",
            get(menu::get_by_id)
                .put(menu::update)
                .delete(menu::delete),
        )
        .route("/{id}/status", patch(menu::set_status))
}
