//! 后台用户

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use super::{
    Activities, InventoryTransactions, MaterialRequests, ROLES, Sessions, Sites, UserSiteAssignments,
};
use crate::domain::table::{SITE_LOG, Table, Validate, fields};
use crate::domain::validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub avatar_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInsert {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_key: Option<String>,
}

impl Validate for UserInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("full_name", &self.full_name)?;
        validate::email("email", &self.email)?;
        validate::one_of_opt("role", self.role.as_ref(), ROLES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_key: Option<String>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("full_name", self.full_name.as_ref())?;
        validate::email_opt("email", self.email.as_ref())?;
        validate::one_of_opt("role", self.role.as_ref(), ROLES)
    }
}

pub struct Users;

impl Table for Users {
    const NAME: &'static str = "users";
    const ENTITY: &'static str = "User";
    const ORDER_BY: &'static str = "full_name ASC, id ASC";
    /// 删除用户时级联删除或置空的表
    const DEPENDENTS: &'static [&'static str] = &[
        Sessions::NAME,
        UserSiteAssignments::NAME,
        Activities::NAME,
        MaterialRequests::NAME,
        Sites::NAME,
        InventoryTransactions::NAME,
        SITE_LOG,
    ];

    type Row = UserRow;
    type Insert = UserInsert;
    type Update = UserUpdate;

    fn id(row: &UserRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &UserRow) -> Vec<&str> {
        fields(
            [row.full_name.as_str(), row.email.as_str(), row.role.as_str()],
            [&row.phone],
        )
    }
}
