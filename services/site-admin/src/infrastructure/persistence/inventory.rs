//! 库存仓储的 PostgreSQL 实现

use async_trait::async_trait;
use rust_decimal::Decimal;
use siteops_adapter_postgres::{is_undefined_function, map_sqlx_error};
use siteops_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::tables::{InventoryTransactionRow, StockMovement};
use crate::domain::{InventoryRepository, SiteTransaction, StockSummary, apply_movement};

pub struct PgInventoryRepository {
    pool: PgPool,
}

impl PgInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn server_stock_summary(&self, site_id: Uuid) -> AppResult<Option<Vec<StockSummary>>> {
        let result = sqlx::query_as::<_, StockSummary>(
            r#"
            SELECT item_id, item_name, item_category, item_unit, current_stock, last_updated
            FROM site_stock_summary($1)
            "#,
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(rows) => Ok(Some(rows)),
            Err(e) if is_undefined_function(&e) => Ok(None),
            Err(e) => Err(map_sqlx_error(e)),
        }
    }

    async fn site_transactions(&self, site_id: Uuid) -> AppResult<Vec<SiteTransaction>> {
        sqlx::query_as::<_, SiteTransaction>(
            r#"
            SELECT t.id, t.item_id, t.site_id, t.transaction_type, t.quantity,
                   t.previous_stock, t.new_stock, t.notes, t.created_by, t.created_at,
                   i.name AS item_name, i.category AS item_category, i.unit AS item_unit
            FROM inventory_transactions t
            LEFT JOIN inventory_items i ON i.id = t.item_id
            WHERE t.site_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn record_movement(&self, movement: &StockMovement) -> AppResult<InventoryTransactionRow> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        // 同一站点同一物料的变动串行执行
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))")
            .bind(movement.site_id)
            .bind(movement.item_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let previous: Decimal = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT new_stock FROM inventory_transactions
            WHERE site_id = $1 AND item_id = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(movement.site_id)
        .bind(movement.item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .unwrap_or(Decimal::ZERO);

        let new_stock = apply_movement(previous, movement.transaction_type, movement.quantity)?;
        debug!(
            site_id = %movement.site_id,
            item_id = %movement.item_id,
            %previous,
            %new_stock,
            "Recording stock movement"
        );

        let row = sqlx::query_as::<_, InventoryTransactionRow>(
            r#"
            INSERT INTO inventory_transactions
                (id, item_id, site_id, transaction_type, quantity, previous_stock, new_stock,
                 notes, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, clock_timestamp())
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(movement.item_id)
        .bind(movement.site_id)
        .bind(movement.transaction_type)
        .bind(movement.quantity)
        .bind(previous)
        .bind(new_stock)
        .bind(&movement.notes)
        .bind(movement.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit stock movement: {}", e)))?;

        info!(transaction_id = %row.id, kind = row.transaction_type.as_str(), "Stock movement recorded");
        Ok(row)
    }
}
