//! 首页统计

use std::sync::Arc;

use siteops_errors::AppResult;

use super::query_cache::{QueryCache, QueryKey};
use crate::domain::{DASHBOARD, DashboardCounts, DashboardRepository};

pub struct DashboardService {
    repository: Arc<dyn DashboardRepository>,
    cache: QueryCache,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn DashboardRepository>, cache: QueryCache) -> Self {
        Self { repository, cache }
    }

    pub async fn counts(&self) -> AppResult<Arc<DashboardCounts>> {
        self.cache
            .get_or_load(QueryKey::new(DASHBOARD, ""), self.repository.counts())
            .await
    }
}
