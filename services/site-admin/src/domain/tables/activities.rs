//! 站点活动

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

pub const ACTIVITY_STATUSES: &[&str] = &["pending", "in_progress", "completed", "cancelled"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub site_id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInsert {
    pub site_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Validate for ActivityInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("title", &self.title)?;
        validate::one_of_opt("status", self.status.as_ref(), ACTIVITY_STATUSES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Validate for ActivityUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::not_blank("title", self.title.as_ref())?;
        validate::one_of_opt("status", self.status.as_ref(), ACTIVITY_STATUSES)
    }
}

pub struct Activities;

impl Table for Activities {
    const NAME: &'static str = "activities";
    const ENTITY: &'static str = "Activity";
    const SITE_COLUMN: Option<&'static str> = Some("site_id");

    type Row = ActivityRow;
    type Insert = ActivityInsert;
    type Update = ActivityUpdate;

    fn id(row: &ActivityRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &ActivityRow) -> Vec<&str> {
        fields([row.title.as_str(), row.status.as_str()], [&row.description])
    }
}
