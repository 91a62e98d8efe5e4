//! 员工端登录会话

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::{AppError, AppResult};
use uuid::Uuid;

use crate::domain::table::{Table, Validate};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl Validate for SessionInsert {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// 后台只能结束会话
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionUpdate {
    /// 结束会话：未给出结束时间时取当前时间
    pub fn normalized(mut self) -> Self {
        if self.is_active == Some(false) && self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
        }
        self
    }
}

impl Validate for SessionUpdate {
    fn validate(&self) -> AppResult<()> {
        if self.is_active == Some(true) && self.ended_at.is_some() {
            return Err(AppError::validation("An ended session cannot be active"));
        }
        Ok(())
    }
}

pub struct Sessions;

impl Table for Sessions {
    const NAME: &'static str = "sessions";
    const ENTITY: &'static str = "Session";
    const ORDER_BY: &'static str = "started_at DESC, id DESC";
    const TOUCHES_UPDATED_AT: bool = false;

    type Row = SessionRow;
    type Insert = SessionInsert;
    type Update = SessionUpdate;

    fn id(row: &SessionRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &SessionRow) -> Vec<&str> {
        [&row.device_info, &row.ip_address]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .collect()
    }
}
