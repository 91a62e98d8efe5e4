//! 库存物料与库存流水

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteops_errors::{AppError, AppResult};
use uuid::Uuid;

use super::{MaterialRequests, PurchaseOrderItems};
use crate::domain::stock::TransactionType;
use crate::domain::table::{SITE_LOG, SITE_STOCK, Table, Validate, fields};
use crate::domain::validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItemRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub reorder_level: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemInsert {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<Decimal>,
}

impl Validate for InventoryItemInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("name", &self.name)?;
        validate::not_blank("unit", self.unit.as_ref())?;
        if let Some(level) = self.reorder_level {
            validate::non_negative("reorder_level", level)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<Decimal>,
}

impl Validate for InventoryItemUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("name", self.name.as_ref())?;
        validate::not_blank("unit", self.unit.as_ref())?;
        if let Some(level) = self.reorder_level {
            validate::non_negative("reorder_level", level)?;
        }
        Ok(())
    }
}

pub struct InventoryItems;

impl Table for InventoryItems {
    const NAME: &'static str = "inventory_items";
    const ENTITY: &'static str = "Inventory item";
    const ORDER_BY: &'static str = "name ASC, id ASC";
    const DEPENDENTS: &'static [&'static str] = &[
        SITE_STOCK,
        SITE_LOG,
        MaterialRequests::NAME,
        PurchaseOrderItems::NAME,
    ];

    type Row = InventoryItemRow;
    type Insert = InventoryItemInsert;
    type Update = InventoryItemUpdate;

    fn id(row: &InventoryItemRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &InventoryItemRow) -> Vec<&str> {
        fields([row.name.as_str(), row.unit.as_str()], [&row.category, &row.sku])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryTransactionRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub site_id: Uuid,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// 库存变动请求；前后库存由存储层在事务内计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub site_id: Uuid,
    pub item_id: Uuid,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

impl Validate for StockMovement {
    fn validate(&self) -> AppResult<()> {
        match self.transaction_type {
            TransactionType::In | TransactionType::Out => validate::positive("quantity", self.quantity),
            TransactionType::Adjustment => validate::non_negative("quantity", self.quantity),
        }
    }
}

/// 流水只追加
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppendOnly {}

impl Validate for AppendOnly {
    fn validate(&self) -> AppResult<()> {
        Err(AppError::validation("Inventory transactions cannot be modified"))
    }
}

pub struct InventoryTransactions;

impl Table for InventoryTransactions {
    const NAME: &'static str = "inventory_transactions";
    const ENTITY: &'static str = "Stock movement";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");
    const TOUCHES_UPDATED_AT: bool = false;
    const DEPENDENTS: &'static [&'static str] = &[SITE_STOCK, SITE_LOG];

    type Row = InventoryTransactionRow;
    type Insert = StockMovement;
    type Update = AppendOnly;

    fn id(row: &InventoryTransactionRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &InventoryTransactionRow) -> Vec<&str> {
        fields([row.transaction_type.as_str()], [&row.notes])
    }
}
