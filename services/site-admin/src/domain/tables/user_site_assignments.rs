//! 用户与站点的分配关系

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use super::ROLES;
use crate::domain::table::{Table, Validate};
use crate::domain::validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSiteAssignmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub site_id: Uuid,
    pub role: String,
    pub assigned_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSiteAssignmentInsert {
    pub user_id: Uuid,
    pub site_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Validate for UserSiteAssignmentInsert {
    fn validate(&self) -> AppResult<()> {
        validate::one_of_opt("role", self.role.as_ref(), ROLES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSiteAssignmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Validate for UserSiteAssignmentUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::one_of_opt("role", self.role.as_ref(), ROLES)
    }
}

/// 同一用户在同一站点只有一条分配（唯一约束冲突返回 409）
pub struct UserSiteAssignments;

impl Table for UserSiteAssignments {
    const NAME: &'static str = "user_site_assignments";
    const ENTITY: &'static str = "Assignment";
    const ORDER_BY: &'static str = "assigned_at DESC, id DESC";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");
    const TOUCHES_UPDATED_AT: bool = false;

    type Row = UserSiteAssignmentRow;
    type Insert = UserSiteAssignmentInsert;
    type Update = UserSiteAssignmentUpdate;

    fn id(row: &UserSiteAssignmentRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &UserSiteAssignmentRow) -> Vec<&str> {
        vec![row.role.as_str()]
    }
}
