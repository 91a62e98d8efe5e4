//! 员工端短信验证码记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::table::{Table, Validate};
use crate::domain::validate;

pub const OTP_PURPOSES: &[&str] = &["login", "attendance", "verification"];

/// 验证码本身不对外输出
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeOtpRow {
    pub id: Uuid,
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub otp_code: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeOtpInsert {
    pub phone: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Validate for EmployeeOtpInsert {
    fn validate(&self) -> AppResult<()> {
        validate::required("phone", &self.phone)?;
        validate::required("otp_code", &self.otp_code)?;
        validate::one_of_opt("purpose", self.purpose.as_ref(), OTP_PURPOSES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeOtpUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl Validate for EmployeeOtpUpdate {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct EmployeeOtps;

impl Table for EmployeeOtps {
    const NAME: &'static str = "employee_otps";
    const ENTITY: &'static str = "OTP record";
    const TOUCHES_UPDATED_AT: bool = false;

    type Row = EmployeeOtpRow;
    type Insert = EmployeeOtpInsert;
    type Update = EmployeeOtpUpdate;

    fn id(row: &EmployeeOtpRow) -> Uuid {
        row.id
    }

    fn search_fields(row: &EmployeeOtpRow) -> Vec<&str> {
        vec![row.phone.as_str(), row.purpose.as_str()]
    }
}
