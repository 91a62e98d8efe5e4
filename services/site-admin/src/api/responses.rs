//! 写操作响应

use serde::Serialize;
use serde_json::Value;

/// 写操作的提示信息
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: "success",
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub data: Value,
    pub notice: Notice,
}

impl MutationResponse {
    pub fn created(entity: &str, data: Value) -> Self {
        Self::done(entity, "created", data)
    }

    pub fn updated(entity: &str, data: Value) -> Self {
        Self::done(entity, "updated", data)
    }

    pub fn deleted(entity: &str, data: Value) -> Self {
        Self::done(entity, "deleted", data)
    }

    fn done(entity: &str, verb: &str, data: Value) -> Self {
        Self {
            data,
            notice: Notice::success(format!("{} {}", entity, verb)),
        }
    }
}
