//! 客户预约（看房/到访）

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

pub const BOOKING_STATUSES: &[&str] = &["pending", "confirmed", "completed", "cancelled"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub site_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub slot: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingInsert {
    pub customer_name: String,
    pub customer_phone: String,
    pub booking_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for BookingInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("customer_name", &self.customer_name)?;
        validate::required("customer_phone", &self.customer_phone)?;
        validate::email_opt("customer_email", self.customer_email.as_ref())?;
        validate::one_of_opt("status", self.status.as_ref(), BOOKING_STATUSES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for BookingUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("customer_name", self.customer_name.as_ref())?;
        validate::not_blank("customer_phone", self.customer_phone.as_ref())?;
        validate::email_opt("customer_email", self.customer_email.as_ref())?;
        validate::one_of_opt("status", self.status.as_ref(), BOOKING_STATUSES)
    }
}

pub struct Bookings;

impl Table for Bookings {
    const NAME: &'static str = "bookings";
    const ENTITY: &'static str = "Booking";
    const ORDER_BY: &'static str = "booking_date DESC, created_at DESC, id DESC";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");

    type Row = BookingRow;
    type Insert = BookingInsert;
    type Update = BookingUpdate;

    fn id(row: &BookingRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &BookingRow) -> Vec<&str> {
        fields(
            [
                row.customer_name.as_str(),
                row.customer_phone.as_str(),
                row.status.as_str(),
            ],
            [&row.customer_email],
        )
    }
}
