//! Repository for the dashboard summary.

use sqlx::PgPool;
use pstats_core::scope::GeoFilter;
use pstats_core::types::DbId;

use crate::models::dashboard::DashboardSummary;

/// Cross-table counts for the landing page.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Gather every dashboard count in one round trip.
    pub async fn summary(
        pool: &PgPool,
        scope: &GeoFilter,
        user_id: DbId,
    ) -> Result<DashboardSummary, sqlx::Error> {
        sqlx::query_as::<_, DashboardSummary>(
            "WITH scoped AS ( \
                 SELECT ps.battalion_id, ps.reporting_date FROM performance_statistics ps \
                 WHERE ($1::BIGINT IS NULL OR ps.state_id = $1) \
                   AND ($2::BIGINT IS NULL OR ps.district_id = $2) \
                   AND ($3::BIGINT IS NULL OR ps.range_id = $3) \
                   AND ($4::BIGINT IS NULL OR ps.battalion_id = $4) \
             ) \
             SELECT \
                 (SELECT COUNT(*) FROM states WHERE active)::BIGINT AS states, \
                 (SELECT COUNT(*) FROM districts WHERE active)::BIGINT AS districts, \
                 (SELECT COUNT(*) FROM ranges WHERE active)::BIGINT AS ranges, \
                 (SELECT COUNT(*) FROM battalions WHERE active)::BIGINT AS battalions, \
                 (SELECT COUNT(*) FROM modules WHERE active)::BIGINT AS modules, \
                 (SELECT COUNT(*) FROM topics WHERE active)::BIGINT AS topics, \
                 (SELECT COUNT(*) FROM sub_topics WHERE active)::BIGINT AS sub_topics, \
                 (SELECT COUNT(*) FROM questions WHERE active)::BIGINT AS questions, \
                 (SELECT COUNT(*) FROM users WHERE active)::BIGINT AS active_users, \
                 (SELECT COUNT(*) FROM scoped)::BIGINT AS statistics_total, \
                 (SELECT COUNT(*) FROM scoped \
                    WHERE reporting_date >= CURRENT_DATE - 30)::BIGINT \
                    AS statistics_last_30_days, \
                 (SELECT COUNT(DISTINCT battalion_id) FROM scoped \
                    WHERE reporting_date >= CURRENT_DATE - 30)::BIGINT \
                    AS battalions_reporting_last_30_days, \
                 (SELECT COUNT(*) FROM communication_users cu \
                    JOIN communications c ON c.id = cu.communication_id \
                    WHERE cu.user_id = $5 AND cu.is_read = FALSE AND c.active)::BIGINT \
                    AS unread_communications",
        )
        .bind(scope.state_id)
        .bind(scope.district_id)
        .bind(scope.range_id)
        .bind(scope.battalion_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
