//! 登录校验
//!
//! 除登录与运维路径外，所有请求（包括未知路径）都需要有效的 Bearer 令牌。

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use siteops_errors::AppError;
use tracing::{debug, warn};

use super::error::ApiError;
use super::state::AppState;
use crate::domain::RecordStore;

/// 已登录的管理员
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub token_id: String,
    pub expires_at: i64,
}

pub async fn require_session<S: RecordStore>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::at(AppError::unauthenticated("Sign in to continue"), &path))?;

    let claims = state
        .auth
        .tokens()
        .validate_access_token(token)
        .map_err(|e| {
            warn!(%path, error = %e, "Rejected session token");
            ApiError::at(e, &path)
        })?;

    debug!(email = claims.email(), %path, "Session accepted");
    request.extensions_mut().insert(CurrentUser {
        email: claims.sub,
        token_id: claims.jti,
        expires_at: claims.exp,
    });
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            ApiError::at(AppError::unauthenticated("Sign in to continue"), parts.uri.path())
        })
    }
}
