//! Repository for the `communications`, `communication_users` and
//! `messages` tables.

use sqlx::PgPool;
use pstats_core::scope::GeoFilter;
use pstats_core::types::DbId;

use crate::models::communication::{
    Communication, CommunicationListItem, MailboxQuery, Message, NewCommunication, Recipient,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, subject, body, sender_id, kind, priority, active, created_at, updated_at";

/// Columns of a listing row, selected from `communications c JOIN users s`.
const LIST_COLUMNS: &str = "c.id, c.subject, c.sender_id, s.full_name AS sender_name, \
    c.kind, c.priority, \
    (SELECT COUNT(*) FROM communication_users r WHERE r.communication_id = c.id)::BIGINT \
        AS recipient_count, \
    (SELECT COUNT(*) FROM messages m WHERE m.communication_id = c.id)::BIGINT \
        AS message_count, \
    c.created_at";

const INBOX_FILTER: &str = "FROM communications c \
    JOIN communication_users cu ON cu.communication_id = c.id AND cu.user_id = $1 \
    JOIN users s ON s.id = c.sender_id \
    WHERE c.active = TRUE \
      AND ($2::TEXT IS NULL OR c.subject ILIKE $2) \
      AND ($3::BOOL = FALSE OR cu.is_read = FALSE)";

const SENT_FILTER: &str = "FROM communications c \
    JOIN users s ON s.id = c.sender_id \
    WHERE c.active = TRUE AND c.sender_id = $1 \
      AND ($2::TEXT IS NULL OR c.subject ILIKE $2)";

const MESSAGE_COLUMNS: &str = "m.id, m.communication_id, m.sender_id, \
    u.full_name AS sender_name, m.body, m.created_at, m.updated_at";

/// Provides operations for communications and their threads.
pub struct CommunicationRepo;

impl CommunicationRepo {
    /// Insert a direct communication and one delivery row per recipient,
    /// within a single transaction.
    pub async fn create_with_recipients(
        pool: &PgPool,
        input: &NewCommunication,
        recipient_ids: &[DbId],
    ) -> Result<Communication, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO communications (subject, body, sender_id, kind, priority)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let communication = sqlx::query_as::<_, Communication>(&query)
            .bind(input.subject.trim())
            .bind(&input.body)
            .bind(input.sender_id)
            .bind(input.kind)
            .bind(&input.priority)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO communication_users (communication_id, user_id) \
             SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(communication.id)
        .bind(recipient_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(communication)
    }

    /// Insert a broadcast addressed to every active user inside `target`,
    /// excluding the sender. Returns the communication and its recipient count.
    pub async fn broadcast(
        pool: &PgPool,
        input: &NewCommunication,
        target: &GeoFilter,
    ) -> Result<(Communication, u64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO communications (subject, body, sender_id, kind, priority)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let communication = sqlx::query_as::<_, Communication>(&query)
            .bind(input.subject.trim())
            .bind(&input.body)
            .bind(input.sender_id)
            .bind(input.kind)
            .bind(&input.priority)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query(
            "INSERT INTO communication_users (communication_id, user_id) \
             SELECT $1, u.id FROM users u \
             WHERE u.active = TRUE AND u.id <> $2 \
               AND ($3::BIGINT IS NULL OR u.state_id = $3) \
               AND ($4::BIGINT IS NULL OR u.district_id = $4) \
               AND ($5::BIGINT IS NULL OR u.range_id = $5) \
               AND ($6::BIGINT IS NULL OR u.battalion_id = $6)",
        )
        .bind(communication.id)
        .bind(input.sender_id)
        .bind(target.state_id)
        .bind(target.district_id)
        .bind(target.range_id)
        .bind(target.battalion_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((communication, result.rows_affected()))
    }

    /// How many of `user_ids` belong to active users.
    pub async fn count_active_users(pool: &PgPool, user_ids: &[DbId]) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM users WHERE id = ANY($1) AND active = TRUE",
        )
        .bind(user_ids)
        .fetch_one(pool)
        .await
    }

    /// Communications delivered to a user, newest first.
    pub async fn list_inbox(
        pool: &PgPool,
        params: &MailboxQuery,
    ) -> Result<Vec<CommunicationListItem>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS}, cu.is_read, cu.read_at {INBOX_FILTER} \
             ORDER BY c.created_at DESC, c.id DESC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, CommunicationListItem>(&query)
            .bind(params.user_id)
            .bind(&params.search)
            .bind(params.unread_only)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_inbox(pool: &PgPool, params: &MailboxQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT {INBOX_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.user_id)
            .bind(&params.search)
            .bind(params.unread_only)
            .fetch_one(pool)
            .await
    }

    /// Communications a user has sent, newest first.
    pub async fn list_sent(
        pool: &PgPool,
        params: &MailboxQuery,
    ) -> Result<Vec<CommunicationListItem>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS}, NULL::BOOL AS is_read, NULL::TIMESTAMPTZ AS read_at \
             {SENT_FILTER} \
             ORDER BY c.created_at DESC, c.id DESC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CommunicationListItem>(&query)
            .bind(params.user_id)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_sent(pool: &PgPool, params: &MailboxQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT {SENT_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.user_id)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Find an active communication by ID regardless of participants.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Communication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM communications WHERE id = $1 AND active = TRUE");
        sqlx::query_as::<_, Communication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active communication the user sent or received.
    pub async fn find_for_participant(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Communication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM communications c
             WHERE c.id = $1 AND c.active = TRUE
               AND (c.sender_id = $2 OR EXISTS (
                    SELECT 1 FROM communication_users cu
                    WHERE cu.communication_id = c.id AND cu.user_id = $2))"
        );
        sqlx::query_as::<_, Communication>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Recipients of a communication ordered by name.
    pub async fn list_recipients(
        pool: &PgPool,
        communication_id: DbId,
    ) -> Result<Vec<Recipient>, sqlx::Error> {
        sqlx::query_as::<_, Recipient>(
            "SELECT cu.user_id, u.full_name, cu.is_read, cu.read_at \
             FROM communication_users cu JOIN users u ON u.id = cu.user_id \
             WHERE cu.communication_id = $1 \
             ORDER BY u.full_name ASC, cu.user_id ASC",
        )
        .bind(communication_id)
        .fetch_all(pool)
        .await
    }

    /// Mark the user's delivery row as read.
    ///
    /// Returns `false` if the user is not a recipient. Reading twice keeps the
    /// original `read_at`.
    pub async fn mark_read(
        pool: &PgPool,
        communication_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE communication_users \
             SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE communication_id = $1 AND user_id = $2",
        )
        .bind(communication_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of active communications the user has not read yet.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM communication_users cu \
             JOIN communications c ON c.id = cu.communication_id \
             WHERE cu.user_id = $1 AND cu.is_read = FALSE AND c.active = TRUE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Append a reply to a thread.
    ///
    /// Every other recipient's delivery row is reset to unread in the same
    /// transaction.
    pub async fn add_message(
        pool: &PgPool,
        communication_id: DbId,
        sender_id: DbId,
        body: &str,
    ) -> Result<Message, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let message_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO messages (communication_id, sender_id, body) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(communication_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE communication_users SET is_read = FALSE, read_at = NULL \
             WHERE communication_id = $1 AND user_id <> $2",
        )
        .bind(communication_id)
        .bind(sender_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m JOIN users u ON u.id = m.sender_id \
             WHERE m.id = $1"
        );
        let message = sqlx::query_as::<_, Message>(&query)
            .bind(message_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// Replies in a thread, oldest first.
    pub async fn list_messages(
        pool: &PgPool,
        communication_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m JOIN users u ON u.id = m.sender_id \
             WHERE m.communication_id = $1 \
             ORDER BY m.created_at ASC, m.id ASC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(communication_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_messages(pool: &PgPool, communication_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM messages WHERE communication_id = $1",
        )
        .bind(communication_id)
        .fetch_one(pool)
        .await
    }

    /// Soft-delete a communication. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE communications SET active = FALSE WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
