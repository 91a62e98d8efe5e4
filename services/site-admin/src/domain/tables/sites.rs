//! 施工站点

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use super::{
    Activities, AuthorizedPersons, Bookings, MaterialRequests, PurchaseOrders, UserSiteAssignments,
};
use crate::domain::table::{SITE_LOG, SITE_STOCK, Table, Validate, fields};
use crate::domain::validate;

pub const SITE_STATUSES: &[&str] = &["planning", "active", "on_hold", "completed"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub status: String,
    pub manager_id: Option<Uuid>,
    pub image_key: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInsert {
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Validate for SiteInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("name", &self.name)?;
        validate::required("code", &self.code)?;
        validate::one_of_opt("status", self.status.as_ref(), SITE_STATUSES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Validate for SiteUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("name", self.name.as_ref())?;
        validate::not_blank("code", self.code.as_ref())?;
        validate::one_of_opt("status", self.status.as_ref(), SITE_STATUSES)
    }
}

pub struct Sites;

impl Table for Sites {
    const NAME: &'static str = "sites";
    const ENTITY: &'static str = "Site";
    const ORDER_BY: &'static str = "name ASC, id ASC";
    /// 删除站点时级联删除或置空的表
    const DEPENDENTS: &'static [&'static str] = &[
        Activities::NAME,
        MaterialRequests::NAME,
        AuthorizedPersons::NAME,
        UserSiteAssignments::NAME,
        PurchaseOrders::NAME,
        Bookings::NAME,
        SITE_STOCK,
        SITE_LOG,
    ];

    type Row = SiteRow;
    type Insert = SiteInsert;
    type Update = SiteUpdate;

    fn id(row: &SiteRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &SiteRow) -> Vec<&str> {
        fields(
            [row.name.as_str(), row.code.as_str(), row.status.as_str()],
            [&row.address, &row.city],
        )
    }
}
