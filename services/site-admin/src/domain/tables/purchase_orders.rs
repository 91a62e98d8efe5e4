//! 采购订单与订单明细

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteops_errors::{AppError, AppResult};
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

pub const ORDER_STATUSES: &[&str] = &["draft", "submitted", "approved", "received", "cancelled"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PurchaseOrderRow {
    pub id: Uuid,
    pub po_number: String,
    pub vendor_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderInsert {
    pub po_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for PurchaseOrderInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("po_number", &self.po_number)?;
        validate::one_of_opt("status", self.status.as_ref(), ORDER_STATUSES)?;
        if let Some(total) = self.total_amount {
            validate::non_negative("total_amount", total)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseOrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for PurchaseOrderUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("po_number", self.po_number.as_ref())?;
        validate::one_of_opt("status", self.status.as_ref(), ORDER_STATUSES)?;
        if let Some(total) = self.total_amount {
            validate::non_negative("total_amount", total)?;
        }
        Ok(())
    }
}

pub struct PurchaseOrders;

impl Table for PurchaseOrders {
    const NAME: &'static str = "purchase_orders";
    const ENTITY: &'static str = "Purchase order";
    const ORDER_BY: &'static str = "order_date DESC, created_at DESC, id DESC";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");
    const DEPENDENTS: &'static [&'static str] = &[PurchaseOrderItems::NAME];

    type Row = PurchaseOrderRow;
    type Insert = PurchaseOrderInsert;
    type Update = PurchaseOrderUpdate;

    fn id(row: &PurchaseOrderRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &PurchaseOrderRow) -> Vec<&str> {
        fields([row.po_number.as_str(), row.status.as_str()], [&row.notes])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PurchaseOrderItemRow {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub item_id: Option<Uuid>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl PurchaseOrderItemRow {
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItemInsert {
    pub purchase_order_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
}

impl Validate for PurchaseOrderItemInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("description", &self.description)?;
        validate::positive("quantity", self.quantity)?;
        validate::non_negative("unit_price", self.unit_price)
    }
}

/// 明细随订单创建，之后不单独修改
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedLine {}

impl Validate for FixedLine {
    fn validate(&self) -> AppResult<()> {
        Err(AppError::validation("Order lines cannot be modified"))
    }
}

pub struct PurchaseOrderItems;

impl Table for PurchaseOrderItems {
    const NAME: &'static str = "purchase_order_items";
    const ENTITY: &'static str = "Order line";
    const ORDER_BY: &'static str = "created_at ASC, id ASC";
    const TOUCHES_UPDATED_AT: bool = false;

    type Row = PurchaseOrderItemRow;
    type Insert = PurchaseOrderItemInsert;
    type Update = FixedLine;

    fn id(row: &PurchaseOrderItemRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &PurchaseOrderItemRow) -> Vec<&str> {
        vec![row.description.as_str()]
    }
}

/// 新订单的明细行（尚无订单 ID）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub item_id: Option<Uuid>,
}

impl OrderLine {
    pub fn for_order(&self, purchase_order_id: Uuid) -> PurchaseOrderItemInsert {
        PurchaseOrderItemInsert {
            purchase_order_id,
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            item_id: self.item_id,
        }
    }
}

/// 订单连同明细一起创建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    #[serde(flatten)]
    pub order: PurchaseOrderInsert,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

impl NewPurchaseOrder {
    /// 明细金额合计
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|l| l.quantity * l.unit_price).sum()
    }

    /// 未给出总额时按明细计算
    pub fn with_computed_total(mut self) -> Self {
        if self.order.total_amount.is_none() {
            self.order.total_amount = Some(self.items_total());
        }
        self
    }
}

impl Validate for NewPurchaseOrder {
    fn validate(&self) -> AppResult<()> {
        self.order.validate()?;
        for (index, line) in self.items.iter().enumerate() {
            line.for_order(Uuid::nil())
                .validate()
                .map_err(|e| AppError::validation(format!("items[{}]: {}", index, e.message())))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(total: Option<Decimal>) -> NewPurchaseOrder {
        NewPurchaseOrder {
            order: PurchaseOrderInsert {
                po_number: "PO-1001".to_string(),
                vendor_id: None,
                site_id: None,
                status: None,
                total_amount: total,
                order_date: None,
                expected_date: None,
                notes: None,
            },
            items: vec![
                OrderLine {
                    description: "Cement 50kg".to_string(),
                    quantity: Decimal::from(10),
                    unit_price: Decimal::new(38050, 2),
                    item_id: None,
                },
                OrderLine {
                    description: "TMT bar 12mm".to_string(),
                    quantity: Decimal::new(25, 1),
                    unit_price: Decimal::from(100),
                    item_id: None,
                },
            ],
        }
    }

    #[test]
    fn test_total_computed_from_lines() {
        let order = order(None).with_computed_total();
        assert_eq!(order.order.total_amount, Some(Decimal::new(405500, 2)));
    }

    #[test]
    fn test_explicit_total_kept() {
        let order = order(Some(Decimal::from(1))).with_computed_total();
        assert_eq!(order.order.total_amount, Some(Decimal::from(1)));
    }

    #[test]
    fn test_invalid_line_reports_index() {
        let mut order = order(None);
        order.items[1].quantity = Decimal::ZERO;
        let err = order.validate().unwrap_err();
        assert!(err.message().starts_with("items[1]"));
    }

    #[test]
    fn test_flattened_payload() {
        let payload = serde_json::json!({
            "po_number": "PO-7",
            "items": [{"description": "Sand", "quantity": "2", "unit_price": 50}]
        });
        let order: NewPurchaseOrder = serde_json::from_value(payload).unwrap();
        assert_eq!(order.order.po_number, "PO-7");
        assert_eq!(order.items_total(), Decimal::from(100));
    }
}
