//! 数据库错误映射
//!
//! 在持久化边界把 sqlx 错误统一转换为 AppError

use siteops_errors::AppError;

/// PostgreSQL `undefined_function`
pub const UNDEFINED_FUNCTION: &str = "42883";

/// 将 SQLx 错误转换为 AppError
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => AppError::conflict(match db_err.constraint() {
                Some(name) => format!("Duplicate entry violates unique constraint {}", name),
                None => "Duplicate entry violates unique constraint".to_string(),
            }),
            Some("23503") => AppError::validation("Referenced record does not exist"),
            Some("23514") => AppError::validation(match db_err.constraint() {
                Some(name) => format!("Check constraint {} violated", name),
                None => "Check constraint violation".to_string(),
            }),
            Some("23502") => AppError::validation("Required field is missing"),
            Some("22001") => AppError::validation("String data too long"),
            Some("22P02") => AppError::validation("Invalid input syntax"),
            Some(code) => AppError::database(format!("Database error ({}): {}", code, db_err)),
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut => AppError::internal("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::internal("Database connection pool is closed"),
        sqlx::Error::Protocol(msg) => AppError::internal(format!("Database protocol error: {}", msg)),
        _ => AppError::database(e.to_string()),
    }
}

/// 是否为"函数不存在"错误（服务端聚合函数未部署）
pub fn is_undefined_function(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_FUNCTION))
}
