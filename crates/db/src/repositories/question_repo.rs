//! Repository for the `questions` table.

use sqlx::PgPool;
use pstats_core::questions::TYPE_NUMERIC;
use pstats_core::types::DbId;

use super::common;
use crate::models::common::{ActiveCounts, ListQuery};
use crate::models::content::{
    CreateQuestion, Question, QuestionContext, QuestionFilter, UpdateQuestion,
};

const TABLE: &str = "questions";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "q.id, q.topic_id, q.sub_topic_id, q.question_text, q.question_type, \
                       q.sort_order, q.is_mandatory, q.active, q.created_at, q.updated_at";

/// Shared FROM/WHERE clause for `list` / `count`.
const FILTER: &str = "FROM questions q JOIN topics t ON t.id = q.topic_id \
                      WHERE ($1::BIGINT IS NULL OR t.module_id = $1) \
                        AND ($2::BIGINT IS NULL OR q.topic_id = $2) \
                        AND ($3::BIGINT IS NULL OR q.sub_topic_id = $3) \
                        AND ($4::BOOL IS NULL OR q.active = $4) \
                        AND ($5::TEXT IS NULL OR q.question_text ILIKE $5)";

/// Provides CRUD operations for questions.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Insert a new question, returning the created row.
    ///
    /// `question_type` must already be validated; it defaults to `numeric`.
    pub async fn create(pool: &PgPool, input: &CreateQuestion) -> Result<Question, sqlx::Error> {
        let query = format!(
            "INSERT INTO questions AS q
                (topic_id, sub_topic_id, question_text, question_type, sort_order,
                 is_mandatory, active)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, FALSE), COALESCE($7, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(input.topic_id)
            .bind(input.sub_topic_id)
            .bind(input.question_text.trim())
            .bind(input.question_type.as_deref().unwrap_or(TYPE_NUMERIC))
            .bind(input.sort_order)
            .bind(input.is_mandatory)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions q WHERE q.id = $1");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the content ancestry of a question.
    pub async fn find_context(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<QuestionContext>, sqlx::Error> {
        sqlx::query_as::<_, QuestionContext>(
            "SELECT q.id AS question_id, t.module_id, q.topic_id, q.sub_topic_id, \
                    q.question_type, q.active \
             FROM questions q JOIN topics t ON t.id = q.topic_id \
             WHERE q.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List questions in display order.
    pub async fn list(
        pool: &PgPool,
        params: &ListQuery,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} {FILTER} \
             ORDER BY q.topic_id ASC, q.sort_order ASC, q.id ASC LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(filter.module_id)
            .bind(filter.topic_id)
            .bind(filter.sub_topic_id)
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
        filter: &QuestionFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.module_id)
            .bind(filter.topic_id)
            .bind(filter.sub_topic_id)
            .bind(params.active)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update a question. Only non-`None` fields in `input` are applied.
    ///
    /// A new sub-topic is copied onto the question's statistics in the same
    /// transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuestion,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!(
            "UPDATE questions AS q SET
                sub_topic_id = COALESCE($2, sub_topic_id),
                question_text = COALESCE($3, question_text),
                question_type = COALESCE($4, question_type),
                sort_order = COALESCE($5, sort_order),
                is_mandatory = COALESCE($6, is_mandatory)
             WHERE q.id = $1
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let updated = sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .bind(input.sub_topic_id)
            .bind(input.question_text.as_deref().map(str::trim))
            .bind(&input.question_type)
            .bind(input.sort_order)
            .bind(input.is_mandatory)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_some() && input.sub_topic_id.is_some() {
            sqlx::query(
                "UPDATE performance_statistics SET sub_topic_id = $2 WHERE question_id = $1",
            )
            .bind(id)
            .bind(input.sub_topic_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        common::set_active(pool, TABLE, id, active).await
    }

    /// Number of recorded statistics answering the question.
    pub async fn child_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        common::count_referencing(pool, "performance_statistics", "question_id", id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        common::hard_delete(pool, TABLE, id).await
    }

    pub async fn statistics(pool: &PgPool) -> Result<ActiveCounts, sqlx::Error> {
        common::active_counts(pool, TABLE).await
    }
}
