//! Repository for the `user_sessions` table.

use pstats_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{NewRefreshSession, RefreshSession};

const COLUMNS: &str = "id, user_id, expires_at, is_revoked, created_at";

/// Refresh-token session storage. A refresh token is single use: presenting
/// it claims (revokes) its session and the caller issues a new one.
pub struct SessionRepo;

impl SessionRepo {
    /// Record a freshly issued refresh token.
    pub async fn create(
        pool: &PgPool,
        input: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Revoke the live session holding `hash` and return it.
    ///
    /// The check and the revocation are one statement, so of two concurrent
    /// refreshes with the same token exactly one gets the session back.
    /// Unknown, expired and already-used tokens all yield `None`.
    pub async fn claim(pool: &PgPool, hash: &str) -> Result<Option<RefreshSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET is_revoked = true
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live session of a user (logout, deactivation, password
    /// change). Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let revoked = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();
        Ok(revoked)
    }
}
