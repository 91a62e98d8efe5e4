//! 站点授权联系人

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorizedPersonRow {
    pub id: Uuid,
    pub site_id: Uuid,
    pub name: String,
    pub phone: String,
    pub designation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedPersonInsert {
    pub site_id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

impl Validate for AuthorizedPersonInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("name", &self.name)?;
        validate::required("phone", &self.phone)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedPersonUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

impl Validate for AuthorizedPersonUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("name", self.name.as_ref())?;
        validate::not_blank("phone", self.phone.as_ref())
    }
}

pub struct AuthorizedPersons;

impl Table for AuthorizedPersons {
    const NAME: &'static str = "authorized_persons";
    const ENTITY: &'static str = "Authorized person";
    const ORDER_BY: &'static str = "name ASC, id ASC";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");

    type Row = AuthorizedPersonRow;
    type Insert = AuthorizedPersonInsert;
    type Update = AuthorizedPersonUpdate;

    fn id(row: &AuthorizedPersonRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &AuthorizedPersonRow) -> Vec<&str> {
        fields([row.name.as_str(), row.phone.as_str()], [&row.designation])
    }
}
