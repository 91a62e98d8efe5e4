//! 供应商

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use super::PurchaseOrders;
use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VendorRow {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorInsert {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Validate for VendorInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("name", &self.name)?;
        validate::email_opt("email", self.email.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Validate for VendorUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("name", self.name.as_ref())?;
        validate::email_opt("email", self.email.as_ref())
    }
}

pub struct Vendors;

impl Table for Vendors {
    const NAME: &'static str = "vendors";
    const ENTITY: &'static str = "Vendor";
    const ORDER_BY: &'static str = "name ASC, id ASC";
    const DEPENDENTS: &'static [&'static str] = &[PurchaseOrders::NAME];

    type Row = VendorRow;
    type Insert = VendorInsert;
    type Update = VendorUpdate;

    fn id(row: &VendorRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &VendorRow) -> Vec<&str> {
        fields([row.name.as_str()], [&row.contact_name, &row.email, &row.phone])
    }
}
