//! 登录路由

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::extract::Body;
use super::gate::CurrentUser;
use super::responses::Notice;
use super::state::AppState;
use crate::application::{CodeRequested, SignedIn};
use crate::domain::RecordStore;

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct Identity {
    pub email: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct SignedOut {
    pub notice: Notice,
}

pub async fn request_code<S: RecordStore>(
    State(state): State<AppState<S>>,
    Body(req): Body<CodeRequest>,
) -> ApiResult<Json<CodeRequested>> {
    Ok(Json(state.auth.request_code(&req.email).await?))
}

pub async fn verify_code<S: RecordStore>(
    State(state): State<AppState<S>>,
    Body(req): Body<VerifyRequest>,
) -> ApiResult<Json<SignedIn>> {
    Ok(Json(state.auth.verify_code(&req.email, &req.code).await?))
}

pub async fn me(user: CurrentUser) -> Json<Identity> {
    Json(Identity {
        email: user.email,
        expires_at: user.expires_at,
    })
}

/// 令牌无状态，客户端丢弃即可
pub async fn sign_out(user: CurrentUser) -> Json<SignedOut> {
    tracing::info!(email = %user.email, token_id = %user.token_id, "Signed out");
    Json(SignedOut {
        notice: Notice::success("Signed out"),
    })
}
