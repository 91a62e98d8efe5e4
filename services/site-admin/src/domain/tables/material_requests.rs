//! 物料申请

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

pub const REQUEST_STATUSES: &[&str] = &["pending", "approved", "rejected", "fulfilled"];
pub const REQUEST_PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaterialRequestRow {
    pub id: Uuid,
    pub site_id: Uuid,
    pub requested_by: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub status: String,
    pub priority: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequestInsert {
    pub site_id: Uuid,
    pub material_name: String,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for MaterialRequestInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("material_name", &self.material_name)?;
        validate::positive("quantity", self.quantity)?;
        validate::one_of_opt("status", self.status.as_ref(), REQUEST_STATUSES)?;
        validate::one_of_opt("priority", self.priority.as_ref(), REQUEST_PRIORITIES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialRequestUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for MaterialRequestUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("material_name", self.material_name.as_ref())?;
        if let Some(quantity) = self.quantity {
            validate::positive("quantity", quantity)?;
        }
        validate::one_of_opt("status", self.status.as_ref(), REQUEST_STATUSES)?;
        validate::one_of_opt("priority", self.priority.as_ref(), REQUEST_PRIORITIES)
    }
}

pub struct MaterialRequests;

impl Table for MaterialRequests {
    const NAME: &'static str = "material_requests";
    const ENTITY: &'static str = "Material request";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");

    type Row = MaterialRequestRow;
    type Insert = MaterialRequestInsert;
    type Update = MaterialRequestUpdate;

    fn id(row: &MaterialRequestRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &MaterialRequestRow) -> Vec<&str> {
        fields(
            [
                row.material_name.as_str(),
                row.status.as_str(),
                row.priority.as_str(),
            ],
            [&row.notes],
        )
    }
}
