//! Route definitions for `/communications`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::communication;
use crate::state::AppState;

/// Routes mounted at `/communications`. All endpoints require authentication.
///
/// ```text
/// GET    /                 -> list (?box=inbox|sent)
/// POST   /                 -> create (direct)
/// POST   /broadcast        -> broadcast
/// GET    /unread-count     -> unread_count
/// GET    /{id}             -> get_by_id
/// DELETE /{id}             -> delete (sender or admin)
/// GET    /{id}/messages    -> list_messages
/// POST   /{id}/messages    -> add_message
/// PUT    /{id}/read        -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(communication::list).post(communication::create))
        .route("/broadcast", post(communication::broadcast))
        .route("/unread-count", get(communication::unread_count))
        .route(
            "/{id}",
            get(communication::get_by_id).delete(communication::delete),
        )
        .route(
            "/{id}/messages",
            get(communication::list_messages).post(communication::add_message),
        )
        .route("/{id}/read", put(communication::mark_read))
}
