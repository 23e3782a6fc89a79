//! Query helpers shared by the repositories.
//!
//! Table and column names passed here are compile-time constants from the
//! calling repository, never user input.

use sqlx::{PgConnection, PgPool};
use pstats_core::scope::GeoLevel;
use pstats_core::types::DbId;

use crate::models::common::ActiveCounts;

/// Count all, active and inactive rows of a table with an `active` column.
pub(crate) async fn active_counts(pool: &PgPool, table: &str) -> Result<ActiveCounts, sqlx::Error> {
    let query = format!(
        "SELECT COUNT(*)::BIGINT AS total, \
                COUNT(*) FILTER (WHERE active)::BIGINT AS active, \
                COUNT(*) FILTER (WHERE NOT active)::BIGINT AS inactive \
         FROM {table}"
    );
    sqlx::query_as::<_, ActiveCounts>(&query).fetch_one(pool).await
}

/// Count rows of `table` whose `column` references `id`.
pub(crate) async fn count_referencing(
    pool: &PgPool,
    table: &str,
    column: &str,
    id: DbId,
) -> Result<i64, sqlx::Error> {
    let query = format!("SELECT COUNT(*)::BIGINT FROM {table} WHERE {column} = $1");
    sqlx::query_scalar::<_, i64>(&query)
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Flip the `active` flag of one row. Returns `true` if a row was updated.
pub(crate) async fn set_active(
    pool: &PgPool,
    table: &str,
    id: DbId,
    active: bool,
) -> Result<bool, sqlx::Error> {
    let query = format!("UPDATE {table} SET active = $2 WHERE id = $1");
    let result = sqlx::query(&query)
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Permanently delete one row. Returns `true` if a row was removed.
pub(crate) async fn hard_delete(pool: &PgPool, table: &str, id: DbId) -> Result<bool, sqlx::Error> {
    let query = format!("DELETE FROM {table} WHERE id = $1");
    let result = sqlx::query(&query).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Re-derive the ancestor ids copied onto statistics and user scopes below a
/// geography node that was moved to a new parent.
pub(crate) async fn refresh_geo_ancestors(
    conn: &mut PgConnection,
    level: GeoLevel,
    id: DbId,
) -> Result<(), sqlx::Error> {
    let (key, assignments, tree) = match level {
        GeoLevel::Battalion => (
            "battalion_id",
            "range_id = r.id, district_id = d.id, state_id = d.state_id",
            "battalions n JOIN ranges r ON r.id = n.range_id \
             JOIN districts d ON d.id = r.district_id",
        ),
        GeoLevel::Range => (
            "range_id",
            "district_id = d.id, state_id = d.state_id",
            "ranges n JOIN districts d ON d.id = n.district_id",
        ),
        GeoLevel::District => ("district_id", "state_id = n.state_id", "districts n"),
        GeoLevel::State => return Ok(()),
    };
    for table in ["performance_statistics", "users"] {
        let query = format!(
            "UPDATE {table} t SET {assignments} FROM {tree} \
             WHERE n.id = t.{key} AND t.{key} = $1"
        );
        sqlx::query(&query).bind(id).execute(&mut *conn).await?;
    }
    Ok(())
}

/// WHERE clause over `performance_statistics ps` driven by a
/// [`pstats_core::report::ReportFilter`] bound as `$1..$10`.
pub(crate) const STATISTIC_FILTER: &str = "WHERE ($1::BIGINT IS NULL OR ps.state_id = $1) \
      AND ($2::BIGINT IS NULL OR ps.district_id = $2) \
      AND ($3::BIGINT IS NULL OR ps.range_id = $3) \
      AND ($4::BIGINT IS NULL OR ps.battalion_id = $4) \
      AND ($5::BIGINT IS NULL OR ps.module_id = $5) \
      AND ($6::BIGINT IS NULL OR ps.topic_id = $6) \
      AND ($7::BIGINT IS NULL OR ps.sub_topic_id = $7) \
      AND ($8::BIGINT IS NULL OR ps.question_id = $8) \
      AND ($9::DATE IS NULL OR ps.reporting_date >= $9) \
      AND ($10::DATE IS NULL OR ps.reporting_date <= $10)";

/// Bind the ten [`STATISTIC_FILTER`] parameters in order.
macro_rules! bind_statistic_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.geo.state_id)
            .bind($filter.geo.district_id)
            .bind($filter.geo.range_id)
            .bind($filter.geo.battalion_id)
            .bind($filter.module_id)
            .bind($filter.topic_id)
            .bind($filter.sub_topic_id)
            .bind($filter.question_id)
            .bind($filter.from_date)
            .bind($filter.to_date)
    };
}

pub(crate) use bind_statistic_filter;
