//! Repository for the `performance_statistics` table.

use sqlx::PgPool;
use pstats_core::report::ReportFilter;
use pstats_core::types::DbId;

use super::common::{bind_statistic_filter, STATISTIC_FILTER};
use crate::models::performance_statistic::{
    NewStatistic, PerformanceStatistic, StatisticSummary, UpdateStatistic, UpsertedStatistic,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, battalion_id, range_id, district_id, state_id, question_id, \
                       module_id, topic_id, sub_topic_id, reporting_date, value, remarks, \
                       submitted_by, created_at, updated_at";

/// `xmax` is zero only for rows the statement inserted.
const UPSERT: &str = "INSERT INTO performance_statistics
        (battalion_id, range_id, district_id, state_id, question_id, module_id, topic_id,
         sub_topic_id, reporting_date, value, remarks, submitted_by)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
     ON CONFLICT ON CONSTRAINT uq_performance_statistics_battalion_question_date
     DO UPDATE SET value = EXCLUDED.value,
                   remarks = EXCLUDED.remarks,
                   submitted_by = EXCLUDED.submitted_by";

/// Provides CRUD and upsert operations for performance statistics.
pub struct PerformanceStatisticRepo;

impl PerformanceStatisticRepo {
    /// Insert a statistic, or overwrite the value already recorded for the
    /// same battalion, question and reporting date.
    pub async fn upsert(
        pool: &PgPool,
        input: &NewStatistic,
    ) -> Result<UpsertedStatistic, sqlx::Error> {
        let query = format!("{UPSERT} RETURNING {COLUMNS}, (xmax = 0) AS inserted");
        sqlx::query_as::<_, UpsertedStatistic>(&query)
            .bind(input.location.battalion_id)
            .bind(input.location.range_id)
            .bind(input.location.district_id)
            .bind(input.location.state_id)
            .bind(input.question.question_id)
            .bind(input.question.module_id)
            .bind(input.question.topic_id)
            .bind(input.question.sub_topic_id)
            .bind(input.reporting_date)
            .bind(input.value)
            .bind(&input.remarks)
            .bind(input.submitted_by)
            .fetch_one(pool)
            .await
    }

    /// Upsert several statistics within one transaction. Any failure rolls
    /// back the whole batch.
    pub async fn bulk_upsert(
        pool: &PgPool,
        inputs: &[NewStatistic],
    ) -> Result<Vec<UpsertedStatistic>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(inputs.len());

        let query = format!("{UPSERT} RETURNING {COLUMNS}, (xmax = 0) AS inserted");

        for input in inputs {
            let row = sqlx::query_as::<_, UpsertedStatistic>(&query)
                .bind(input.location.battalion_id)
                .bind(input.location.range_id)
                .bind(input.location.district_id)
                .bind(input.location.state_id)
                .bind(input.question.question_id)
                .bind(input.question.module_id)
                .bind(input.question.topic_id)
                .bind(input.question.sub_topic_id)
                .bind(input.reporting_date)
                .bind(input.value)
                .bind(&input.remarks)
                .bind(input.submitted_by)
                .fetch_one(&mut *tx)
                .await?;
            results.push(row);
        }

        tx.commit().await?;
        Ok(results)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PerformanceStatistic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM performance_statistics WHERE id = $1");
        sqlx::query_as::<_, PerformanceStatistic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List statistics, newest reporting date first.
    pub async fn list(
        pool: &PgPool,
        filter: &ReportFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PerformanceStatistic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM performance_statistics ps {STATISTIC_FILTER} \
             ORDER BY ps.reporting_date DESC, ps.battalion_id ASC, ps.question_id ASC \
             LIMIT $11 OFFSET $12"
        );
        bind_statistic_filter!(sqlx::query_as::<_, PerformanceStatistic>(&query), filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &ReportFilter) -> Result<i64, sqlx::Error> {
        let query =
            format!("SELECT COUNT(*)::BIGINT FROM performance_statistics ps {STATISTIC_FILTER}");
        bind_statistic_filter!(sqlx::query_scalar::<_, i64>(&query), filter)
            .fetch_one(pool)
            .await
    }

    /// Change the value or remarks of a recorded statistic.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStatistic,
        submitted_by: DbId,
    ) -> Result<Option<PerformanceStatistic>, sqlx::Error> {
        let query = format!(
            "UPDATE performance_statistics SET
                value = COALESCE($2, value),
                remarks = COALESCE($3, remarks),
                submitted_by = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PerformanceStatistic>(&query)
            .bind(id)
            .bind(input.value)
            .bind(&input.remarks)
            .bind(submitted_by)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM performance_statistics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Totals over the statistics matching `filter`.
    pub async fn statistics(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<StatisticSummary, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)::BIGINT AS total_records, \
                    COUNT(DISTINCT ps.battalion_id)::BIGINT AS battalions_reporting, \
                    COUNT(DISTINCT ps.question_id)::BIGINT AS questions_answered, \
                    COALESCE(SUM(ps.value), 0)::DOUBLE PRECISION AS total_value, \
                    MIN(ps.reporting_date) AS first_reporting_date, \
                    MAX(ps.reporting_date) AS last_reporting_date \
             FROM performance_statistics ps {STATISTIC_FILTER}"
        );
        bind_statistic_filter!(sqlx::query_as::<_, StatisticSummary>(&query), filter)
            .fetch_one(pool)
            .await
    }
}
