//! 采购订单仓储的 PostgreSQL 实现

use async_trait::async_trait;
use siteops_adapter_postgres::map_sqlx_error;
use siteops_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::record_store::insert_row;
use crate::domain::PurchaseOrderRepository;
use crate::domain::tables::{
    OrderLine, PurchaseOrderInsert, PurchaseOrderItemRow, PurchaseOrderItems, PurchaseOrderRow,
    PurchaseOrders,
};

pub struct PgPurchaseOrderRepository {
    pool: PgPool,
}

impl PgPurchaseOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseOrderRepository for PgPurchaseOrderRepository {
    async fn create_with_items(
        &self,
        order: &PurchaseOrderInsert,
        lines: &[OrderLine],
    ) -> AppResult<(PurchaseOrderRow, Vec<PurchaseOrderItemRow>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        // 任一步失败时 tx 被丢弃，事务回滚
        let created = insert_row::<PurchaseOrders, _>(&mut *tx, order).await?;
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = insert_row::<PurchaseOrderItems, _>(&mut *tx, &line.for_order(created.id)).await?;
            items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit purchase order: {}", e)))?;

        info!(order_id = %created.id, po_number = %created.po_number, lines = items.len(), "Purchase order created");
        Ok((created, items))
    }

    async fn items_for(&self, purchase_order_id: Uuid) -> AppResult<Vec<PurchaseOrderItemRow>> {
        sqlx::query_as::<_, PurchaseOrderItemRow>(
            r#"
            SELECT id, purchase_order_id, item_id, description, quantity, unit_price, created_at
            FROM purchase_order_items
            WHERE purchase_order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(purchase_order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}
