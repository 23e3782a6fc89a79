//! Repository for the `topics` table.

use sqlx::PgPool;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::content::{CreateTopic, Topic, UpdateTopic};

const TABLE: &str = "topics";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, module_id, name, description, sort_order, active, created_at, updated_at";

/// Shared WHERE clause for `list` / `count`.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR module_id = $1) \
                        AND ($2::BOOL IS NULL OR active = $2) \
                        AND ($3::TEXT IS NULL OR name ILIKE $3)";

/// Provides CRUD operations for topics.
pub struct TopicRepo;

impl TopicRepo {
    /// Insert a new topic, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTopic) -> Result<Topic, sqlx::Error> {
        let query = format!(
            "INSERT INTO topics (module_id, name, description, sort_order, active)
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(input.module_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1");
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List topics, optionally within one module, in display order.
    pub async fn list(pool: &PgPool, params: &ListQuery) -> Result<Vec<Topic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM topics {FILTER} \
             ORDER BY sort_order ASC, name ASC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM topics {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.parent_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a topic. Only non-`None` fields in `input` are applied.
    ///
    /// Moving it to another module rewrites `module_id` on its statistics in the
    /// same transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTopic,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!(
            "UPDATE topics SET
                module_id = COALESCE($2, module_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                sort_order = COALESCE($5, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(input.module_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_some() && input.module_id.is_some() {
            sqlx::query(
                "UPDATE performance_statistics ps SET module_id = tp.module_id \
                 FROM topics tp WHERE tp.id = ps.topic_id AND ps.topic_id = $1",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of sub-topics and questions under the topic.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let sub_topics = common::count_referencing(pool, "sub_topics", "topic_id", id).await?;
        let questions = common::count_referencing(pool, "questions", "topic_id", id).await?;
        Ok(sub_topics + questions)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
