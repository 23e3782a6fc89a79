//! Route definitions for `/sub-menus`.
//!
//! Reads require authentication; writes require the admin role.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::sub_menu;
use crate::state::AppState;

/// Routes mounted at `/sub-menus`.
///
/// ```text
/// GET    /               -> list (`?menu_id=`)
/// POST   /               -> create
/// GET    /statistics     -> statistics
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// PATCH  /{id}/status    -> set_status
/// DELETE /{id}           -> delete (refused while permissions reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sub_menu::list).post(sub_menu::create))
        .route("/statistics", get(sub_menu::statistics))
        .route(
            "/{id}",
            get(sub_menu::get_by_id)
                .put(sub_menu::update)
                .delete(sub_menu::delete),
        )
        .route("/{id}/status", patch(sub_menu::set_status))
}
