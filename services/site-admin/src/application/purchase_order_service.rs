//! 采购订单服务

use std::sync::Arc;

use serde::Serialize;
use siteops_errors::AppResult;
use siteops_telemetry::record_mutation;
use tracing::{info, warn};
use uuid::Uuid;

use super::query_cache::{QueryCache, QueryKey};
use crate::domain::tables::{
    NewPurchaseOrder, PurchaseOrderItemRow, PurchaseOrderItems, PurchaseOrderRow, PurchaseOrders,
};
use crate::domain::{PurchaseOrderRepository, Table, Validate};

/// 新建的订单及其明细
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPurchaseOrder {
    #[serde(flatten)]
    pub order: PurchaseOrderRow,
    pub items: Vec<PurchaseOrderItemRow>,
}

pub struct PurchaseOrderService {
    orders: Arc<dyn PurchaseOrderRepository>,
    cache: QueryCache,
}

impl PurchaseOrderService {
    pub fn new(orders: Arc<dyn PurchaseOrderRepository>, cache: QueryCache) -> Self {
        Self { orders, cache }
    }

    /// 订单与明细一起创建；未给出总额时按明细计算
    pub async fn create(&self, request: NewPurchaseOrder) -> AppResult<CreatedPurchaseOrder> {
        let result = match request.validate() {
            Ok(()) => {
                let request = request.with_computed_total();
                self.orders
                    .create_with_items(&request.order, &request.items)
                    .await
            }
            Err(e) => Err(e),
        };
        record_mutation(PurchaseOrders::NAME, "create", result.is_ok());

        match result {
            Ok((order, items)) => {
                info!(
                    order_id = %order.id,
                    po_number = %order.po_number,
                    lines = items.len(),
                    "Purchase order created"
                );
                self.cache
                    .invalidate_after_write(PurchaseOrders::NAME, PurchaseOrders::DEPENDENTS)
                    .await;
                Ok(CreatedPurchaseOrder { order, items })
            }
            Err(e) => {
                warn!(error = %e, "Purchase order rejected");
                Err(e)
            }
        }
    }

    /// 订单明细
    pub async fn items(&self, purchase_order_id: Uuid) -> AppResult<Arc<Vec<PurchaseOrderItemRow>>> {
        let key = QueryKey::new(PurchaseOrderItems::NAME, format!("order:{}", purchase_order_id));
        self.cache
            .get_or_load(key, self.orders.items_for(purchase_order_id))
            .await
    }
}
