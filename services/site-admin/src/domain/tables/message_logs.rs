//! 消息发送记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate, fields};
use crate::domain::validate;

pub const MESSAGE_CHANNELS: &[&str] = &["email", "sms", "whatsapp"];
pub const MESSAGE_STATUSES: &[&str] = &["queued", "sent", "delivered", "failed"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageLogRow {
    pub id: Uuid,
    pub recipient: String,
    pub channel: String,
    pub template: Option<String>,
    pub body: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLogInsert {
    pub recipient: String,
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Validate for MessageLogInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("recipient", &self.recipient)?;
        validate::one_of("channel", &self.channel, MESSAGE_CHANNELS)?;
        validate::one_of_opt("status", self.status.as_ref(), MESSAGE_STATUSES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLogUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Validate for MessageLogUpdate {
    fn validate(&self) -> AppResult<()> {
        validate::one_of_opt("status", self.status.as_ref(), MESSAGE_STATUSES)
    }
}

pub struct MessageLogs;

impl Table for MessageLogs {
    const NAME: &'static str = "message_logs";
    const ENTITY: &'static str = "Message log";
    const TOUCHES_UPDATED_AT: bool = false;

    type Row = MessageLogRow;
    type Insert = MessageLogInsert;
    type Update = MessageLogUpdate;

    fn id(row: &MessageLogRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &MessageLogRow) -> Vec<&str> {
        fields(
            [row.recipient.as_str(), row.channel.as_str(), row.status.as_str()],
            [&row.body],
        )
    }
}
