//! 站点库存服务

use std::sync::Arc;

use siteops_errors::AppResult;
use siteops_telemetry::record_mutation;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::query_cache::{QueryCache, QueryKey};
use crate::domain::tables::{InventoryTransactionRow, InventoryTransactions, StockMovement};
use crate::domain::{
    InventoryRepository, ListFilter, SITE_LOG, SITE_STOCK, SiteTransaction, StockSummary, Table,
    Validate, summarize,
};

pub struct StockService {
    inventory: Arc<dyn InventoryRepository>,
    cache: QueryCache,
}

impl StockService {
    pub fn new(inventory: Arc<dyn InventoryRepository>, cache: QueryCache) -> Self {
        Self { inventory, cache }
    }

    /// 站点各物料的最新库存
    ///
    /// 优先使用数据库端汇总函数，函数不存在时在进程内由流水推导。
    pub async fn site_stock(&self, site_id: Uuid) -> AppResult<Arc<Vec<StockSummary>>> {
        let key = QueryKey::new(SITE_STOCK, ListFilter::site(site_id).scope());
        self.cache
            .get_or_load(key, self.load_site_stock(site_id))
            .await
    }

    async fn load_site_stock(&self, site_id: Uuid) -> AppResult<Vec<StockSummary>> {
        if let Some(summary) = self.inventory.server_stock_summary(site_id).await? {
            debug!(%site_id, items = summary.len(), "Stock summary from database");
            return Ok(summary);
        }
        warn!(%site_id, "site_stock_summary unavailable, deriving stock in process");
        let transactions = self.inventory.site_transactions(site_id).await?;
        Ok(summarize(&transactions).into_vec())
    }

    /// 站点流水，最新在前
    pub async fn site_log(&self, site_id: Uuid) -> AppResult<Arc<Vec<SiteTransaction>>> {
        let key = QueryKey::new(SITE_LOG, ListFilter::site(site_id).scope());
        self.cache
            .get_or_load(key, self.inventory.site_transactions(site_id))
            .await
    }

    /// 记录一次库存变动
    pub async fn record_movement(&self, movement: StockMovement) -> AppResult<InventoryTransactionRow> {
        let result = match movement.validate() {
            Ok(()) => self.inventory.record_movement(&movement).await,
            Err(e) => Err(e),
        };
        record_mutation(InventoryTransactions::NAME, "create", result.is_ok());

        match &result {
            Ok(row) => {
                info!(
                    site_id = %row.site_id,
                    item_id = %row.item_id,
                    kind = row.transaction_type.as_str(),
                    previous = %row.previous_stock,
                    new = %row.new_stock,
                    "Stock movement recorded"
                );
                self.cache
                    .invalidate_after_write(InventoryTransactions::NAME, InventoryTransactions::DEPENDENTS)
                    .await;
            }
            Err(e) => warn!(
                site_id = %movement.site_id,
                item_id = %movement.item_id,
                error = %e,
                "Stock movement rejected"
            ),
        }
        result
    }
}
