//! 字段校验工具

use rust_decimal::Decimal;
use siteops_errors::{AppError, AppResult};

pub fn required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// 更新时给出的字段不能为空白
pub fn not_blank(field: &str, value: Option<&String>) -> AppResult<()> {
    match value {
        Some(v) => required(field, v),
        None => Ok(()),
    }
}

pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> AppResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "{} must be one of: {}",
            field,
            allowed.join(", ")
        )))
    }
}

pub fn one_of_opt(field: &str, value: Option<&String>, allowed: &[&str]) -> AppResult<()> {
    match value {
        Some(v) => one_of(field, v, allowed),
        None => Ok(()),
    }
}

pub fn positive(field: &str, value: Decimal) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{} must be greater than zero", field)));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> AppResult<()> {
    if email_address::EmailAddress::is_valid(value.trim()) {
        Ok(())
    } else {
        Err(AppError::validation(format!("{} is not a valid email address", field)))
    }
}

pub fn email_opt(field: &str, value: Option<&String>) -> AppResult<()> {
    match value {
        Some(v) => email(field, v),
        None => Ok(()),
    }
}
