//! Report queries over `performance_statistics`.
//!
//! Every report shares [`STATISTIC_FILTER`]; the report type only decides
//! grouping and the joins needed to resolve names.

use sqlx::PgPool;
use pstats_core::report::{ReportFilter, TrendInterval};
use pstats_core::scope::GeoLevel;

use super::common::{bind_statistic_filter, STATISTIC_FILTER};
use crate::models::report::{DetailedRow, GeographicRow, SubmissionRow, SummaryRow, TrendRow};

/// Statistic column and name table for each geography level.
fn level_source(level: GeoLevel) -> (&'static str, &'static str) {
    match level {
        GeoLevel::State => ("state_id", "states"),
        GeoLevel::District => ("district_id", "districts"),
        GeoLevel::Range => ("range_id", "ranges"),
        GeoLevel::Battalion => ("battalion_id", "battalions"),
    }
}

/// Runs the aggregation behind each report type.
pub struct ReportRepo;

impl ReportRepo {
    /// Totals per question, in content display order.
    pub async fn summary(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<SummaryRow>, sqlx::Error> {
        let query = format!(
            "SELECT m.id AS module_id, m.name AS module_name, \
                    t.id AS topic_id, t.name AS topic_name, \
                    q.id AS question_id, q.question_text, q.question_type, \
                    COUNT(*)::BIGINT AS record_count, \
                    SUM(ps.value)::DOUBLE PRECISION AS total_value, \
                    AVG(ps.value)::DOUBLE PRECISION AS average_value, \
                    MIN(ps.value)::DOUBLE PRECISION AS min_value, \
                    MAX(ps.value)::DOUBLE PRECISION AS max_value \
             FROM performance_statistics ps \
             JOIN questions q ON q.id = ps.question_id \
             JOIN topics t ON t.id = ps.topic_id \
             JOIN modules m ON m.id = ps.module_id \
             {STATISTIC_FILTER} \
             GROUP BY m.id, m.name, m.sort_order, t.id, t.name, t.sort_order, \
                      q.id, q.question_text, q.question_type, q.sort_order \
             ORDER BY m.sort_order, m.name, t.sort_order, t.name, q.sort_order, q.id"
        );
        bind_statistic_filter!(sqlx::query_as::<_, SummaryRow>(&query), filter)
            .fetch_all(pool)
            .await
    }

    /// Individual statistics with names, newest first.
    pub async fn detailed(
        pool: &PgPool,
        filter: &ReportFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DetailedRow>, sqlx::Error> {
        let query = format!(
            "SELECT ps.id, ps.reporting_date, \
                    s.name AS state_name, d.name AS district_name, r.name AS range_name, \
                    ps.battalion_id, b.name AS battalion_name, \
                    m.name AS module_name, t.name AS topic_name, st.name AS sub_topic_name, \
                    ps.question_id, q.question_text, ps.value, ps.remarks, \
                    u.full_name AS submitted_by_name \
             FROM performance_statistics ps \
             JOIN states s ON s.id = ps.state_id \
             JOIN districts d ON d.id = ps.district_id \
             JOIN ranges r ON r.id = ps.range_id \
             JOIN battalions b ON b.id = ps.battalion_id \
             JOIN modules m ON m.id = ps.module_id \
             JOIN topics t ON t.id = ps.topic_id \
             LEFT JOIN sub_topics st ON st.id = ps.sub_topic_id \
             JOIN questions q ON q.id = ps.question_id \
             JOIN users u ON u.id = ps.submitted_by \
             {STATISTIC_FILTER} \
             ORDER BY ps.reporting_date DESC, b.name ASC, q.sort_order ASC, ps.id ASC \
             LIMIT $11 OFFSET $12"
        );
        bind_statistic_filter!(sqlx::query_as::<_, DetailedRow>(&query), filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of rows the `detailed` report would return without paging.
    pub async fn detailed_count(pool: &PgPool, filter: &ReportFilter) -> Result<i64, sqlx::Error> {
        let query =
            format!("SELECT COUNT(*)::BIGINT FROM performance_statistics ps {STATISTIC_FILTER}");
        bind_statistic_filter!(sqlx::query_scalar::<_, i64>(&query), filter)
            .fetch_one(pool)
            .await
    }

    /// Totals per geography node at `level`, ordered by name.
    pub async fn geographic(
        pool: &PgPool,
        filter: &ReportFilter,
        level: GeoLevel,
    ) -> Result<Vec<GeographicRow>, sqlx::Error> {
        let (column, table) = level_source(level);
        let query = format!(
            "SELECT g.id AS geo_id, g.name AS geo_name, \
                    COUNT(*)::BIGINT AS record_count, \
                    COUNT(DISTINCT ps.battalion_id)::BIGINT AS battalions_reporting, \
                    SUM(ps.value)::DOUBLE PRECISION AS total_value, \
                    AVG(ps.value)::DOUBLE PRECISION AS average_value \
             FROM performance_statistics ps \
             JOIN {table} g ON g.id = ps.{column} \
             {STATISTIC_FILTER} \
             GROUP BY g.id, g.name \
             ORDER BY g.name ASC"
        );
        bind_statistic_filter!(sqlx::query_as::<_, GeographicRow>(&query), filter)
            .fetch_all(pool)
            .await
    }

    /// Totals per `interval` bucket of the reporting date, oldest first.
    pub async fn trend(
        pool: &PgPool,
        filter: &ReportFilter,
        interval: TrendInterval,
    ) -> Result<Vec<TrendRow>, sqlx::Error> {
        let unit = interval.as_str();
        let query = format!(
            "SELECT date_trunc('{unit}', ps.reporting_date)::DATE AS period, \
                    COUNT(*)::BIGINT AS record_count, \
                    SUM(ps.value)::DOUBLE PRECISION AS total_value, \
                    AVG(ps.value)::DOUBLE PRECISION AS average_value \
             FROM performance_statistics ps \
             {STATISTIC_FILTER} \
             GROUP BY 1 \
             ORDER BY 1 ASC"
        );
        bind_statistic_filter!(sqlx::query_as::<_, TrendRow>(&query), filter)
            .fetch_all(pool)
            .await
    }

    /// Reporting activity per active battalion inside the geographic filter,
    /// including battalions that have submitted nothing. Least active first.
    pub async fn submission(
        pool: &PgPool,
        filter: &ReportFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        bind_statistic_filter!(
            sqlx::query_as::<_, SubmissionRow>(
                "SELECT b.id AS battalion_id, b.name AS battalion_name, \
                        r.name AS range_name, d.name AS district_name, s.name AS state_name, \
                        COUNT(ps.id)::BIGINT AS record_count, \
                        COUNT(DISTINCT ps.question_id)::BIGINT AS questions_answered, \
                        MAX(ps.reporting_date) AS last_reporting_date \
                 FROM battalions b \
                 JOIN ranges r ON r.id = b.range_id \
                 JOIN districts d ON d.id = r.district_id \
                 JOIN states s ON s.id = d.state_id \
                 LEFT JOIN performance_statistics ps ON ps.battalion_id = b.id \
                      AND ($5::BIGINT IS NULL OR ps.module_id = $5) \
                      AND ($6::BIGINT IS NULL OR ps.topic_id = $6) \
                      AND ($7::BIGINT IS NULL OR ps.sub_topic_id = $7) \
                      AND ($8::BIGINT IS NULL OR ps.question_id = $8) \
                      AND ($9::DATE IS NULL OR ps.reporting_date >= $9) \
                      AND ($10::DATE IS NULL OR ps.reporting_date <= $10) \
                 WHERE b.active = TRUE \
                   AND ($1::BIGINT IS NULL OR s.id = $1) \
                   AND ($2::BIGINT IS NULL OR d.id = $2) \
                   AND ($3::BIGINT IS NULL OR r.id = $3) \
                   AND ($4::BIGINT IS NULL OR b.id = $4) \
                 GROUP BY b.id, b.name, r.name, d.name, s.name \
                 ORDER BY record_count ASC, b.name ASC \
                 LIMIT $11 OFFSET $12",
            ),
            filter
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
