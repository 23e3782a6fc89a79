//! Route definitions for `/auth`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Authentication routes mounted at `/auth`.
///
/// ```text
/// POST /login          -> login (public)
/// POST /refresh        -> refresh (public)
/// POST /logout         -> logout
/// GET  /me             -> me
/// GET  /me/menus       -> my_menus
/// PUT  /me/password    -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/me/menus", get(auth::my_menus))
        .route("/me/password", put(auth::change_password))
}
