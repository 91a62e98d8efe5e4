//! 客户咨询

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

pub const INQUIRY_STATUSES: &[&str] = &["new", "contacted", "closed"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerInquiryRow {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInquiryInsert {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Validate for CustomerInquiryInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("name", &self.name)?;
        validate::email_opt("email", self.email.as_ref())
    }
}

/// 后台处理咨询：只改状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInquiryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Validate for CustomerInquiryUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::one_of_opt("status", self.status.as_ref(), INQUIRY_STATUSES)
    }
}

pub struct CustomerInquiries;

impl Table for CustomerInquiries {
    const NAME: &'static str = "customer_inquiries";
    const ENTITY: &'static str = "Inquiry";

    type Row = CustomerInquiryRow;
    type Insert = CustomerInquiryInsert;
    type Update = CustomerInquiryUpdate;

    fn id(row: &CustomerInquiryRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &CustomerInquiryRow) -> Vec<&str> {
        fields(
            [row.name.as_str(), row.status.as_str()],
            [&row.phone, &row.email, &row.message],
        )
    }
}
