//! Repository for the `users` and `user_roles` tables.

use sqlx::{PgConnection, PgPool};
use pstats_core::scope::DataScope;
use pstats_core::types::{DbId, Timestamp};

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::user::{CreateUser, UpdateUser, User, UserFilter, UserRoleName};

const TABLE: &str = "users";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, full_name, phone, \
                       state_id, district_id, range_id, battalion_id, active, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR state_id = $1) \
                        AND ($2::BIGINT IS NULL OR district_id = $2) \
                        AND ($3::BIGINT IS NULL OR range_id = $3) \
                        AND ($4::BIGINT IS NULL OR battalion_id = $4) \
                        AND ($5::BIGINT IS NULL OR EXISTS ( \
                                SELECT 1 FROM user_roles ur \
                                WHERE ur.user_id = users.id AND ur.role_id = $5)) \
                        AND ($6::BOOL IS NULL OR active = $6) \
                        AND ($7::TEXT IS NULL OR username ILIKE $7 \
                             OR email ILIKE $7 OR full_name ILIKE $7)";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user together with their roles, returning the created
    /// row. Either both land or neither does.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        role_ids: &[DbId],
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (username, email, password_hash, full_name, phone,
                 state_id, district_id, range_id, battalion_id, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, TRUE))
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let user = sqlx::query_as::<_, User>(&query)
            .bind(input.username.trim())
            .bind(input.email.trim())
            .bind(&input.password_hash)
            .bind(input.full_name.trim())
            .bind(&input.phone)
            .bind(input.scope.state_id)
            .bind(input.scope.district_id)
            .bind(input.scope.range_id)
            .bind(input.scope.battalion_id)
            .bind(input.active)
            .fetch_one(&mut *tx)
            .await?;
        insert_roles(&mut tx, user.id, role_ids).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// List users ordered by most recently created first.
    pub async fn list(
        pool: &PgPool,
        params: &ListQuery,
        filter: &UserFilter,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $8 OFFSET $9"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(filter.geo.state_id)
            .bind(filter.geo.district_id)
            .bind(filter.geo.range_id)
            .bind(filter.geo.battalion_id)
            .bind(filter.role_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        params: &ListQuery,
        filter: &UserFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM users {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.geo.state_id)
            .bind(filter.geo.district_id)
            .bind(filter.geo.range_id)
            .bind(filter.geo.battalion_id)
            .bind(filter.role_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a user's profile. Only non-`None` fields in `input` are applied.
    ///
    /// When `scope` is given it replaces the whole scope in the same
    /// statement; its `None` levels are cleared.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        scope: Option<&DataScope>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                full_name = COALESCE($4, full_name),
                phone = COALESCE($5, phone),
                state_id = CASE WHEN $6::BOOL THEN $7::BIGINT ELSE state_id END,
                district_id = CASE WHEN $6::BOOL THEN $8::BIGINT ELSE district_id END,
                range_id = CASE WHEN $6::BOOL THEN $9::BIGINT ELSE range_id END,
                battalion_id = CASE WHEN $6::BOOL THEN $10::BIGINT ELSE battalion_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let new_scope = scope.copied().unwrap_or_default();
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.username.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(str::trim))
            .bind(input.full_name.as_deref().map(str::trim))
            .bind(&input.phone)
            .bind(scope.is_some())
            .bind(new_scope.state_id)
            .bind(new_scope.district_id)
            .bind(new_scope.range_id)
            .bind(new_scope.battalion_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of communications and statistics the user has authored.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let sent = common::count_referencing(pool, "communications", "sender_id", id).await?;
        let submitted =
            common::count_referencing(pool, "performance_statistics", "submitted_by", id).await?;
        Ok(sent + submitted)
    }

    /// Delete a user. Role assignments and sessions cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }

    /// Names of the active roles held by a user, ordered by role id.
    pub async fn role_names(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 AND r.active = TRUE \
             ORDER BY r.id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Active role names for a batch of users, to avoid one query per row.
    pub async fn role_names_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<UserRoleName>, sqlx::Error> {
        sqlx::query_as::<_, UserRoleName>(
            "SELECT ur.user_id, r.name FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = ANY($1) AND r.active = TRUE \
             ORDER BY ur.user_id ASC, r.id ASC",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }

    /// Replace the full role set of a user within a transaction.
    pub async fn set_roles(
        pool: &PgPool,
        user_id: DbId,
        role_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        insert_roles(&mut tx, user_id, role_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Increment the failed login counter by 1 and return the new count.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE users SET failed_login_count = failed_login_count + 1 \
             WHERE id = $1 RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Lock a user account until the specified timestamp.
    ///
    /// The failure counter restarts so an expired lock allows a full set of
    /// attempts again.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2, failed_login_count = 0 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash and clear any lockout.
    ///
    /// Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, failed_login_count = 0, locked_until = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_roles(
    conn: &mut PgConnection,
    user_id: DbId,
    role_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    if role_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) \
         SELECT $1, UNNEST($2::BIGINT[]) \
         ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role_ids)
    .execute(conn)
    .await?;
    Ok(())
}
