//! 首页统计查询

use async_trait::async_trait;
use siteops_adapter_postgres::map_sqlx_error;
use siteops_errors::AppResult;
use sqlx::PgPool;

use crate::domain::{DashboardCounts, DashboardRepository};

pub struct PgDashboardRepository {
    pool: PgPool,
}

impl PgDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PgDashboardRepository {
    async fn counts(&self) -> AppResult<DashboardCounts> {
        sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM sites) AS sites,
                (SELECT COUNT(*) FROM sites WHERE status = 'active') AS active_sites,
                (SELECT COUNT(*) FROM activities) AS activities,
                (SELECT COUNT(*) FROM material_requests WHERE status = 'pending') AS pending_material_requests,
                (SELECT COUNT(*) FROM bookings) AS bookings,
                (SELECT COUNT(*) FROM bookings
                    WHERE booking_date >= CURRENT_DATE AND status IN ('pending', 'confirmed')) AS upcoming_bookings,
                (SELECT COUNT(*) FROM message_logs WHERE status = 'failed') AS failed_messages
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}
