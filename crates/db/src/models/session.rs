//! Refresh-token sessions.

use pstats_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A refresh-token session. The token itself is never stored, only its hash,
/// which is deliberately left out of the row struct.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

/// Values for a session issued at login or refresh.
pub struct NewRefreshSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
