//! HTTP 错误响应（RFC 7807）

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use siteops_errors::AppError;
use tracing::{debug, error};

/// 处理器返回的错误
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    instance: Option<String>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 附带出错的请求路径
    pub fn at(error: AppError, instance: impl Into<String>) -> Self {
        Self {
            error,
            instance: Some(instance.into()),
        }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            instance: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_server_error() {
            error!(error = %self.error, instance = ?self.instance, "Request failed");
        } else {
            debug!(error = %self.error, instance = ?self.instance, "Request rejected");
        }

        let mut problem = self.error.to_problem_details();
        if let Some(instance) = self.instance {
            problem = problem.with_instance(instance);
        }
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(problem)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
