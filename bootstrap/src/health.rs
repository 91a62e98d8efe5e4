//! 健康检查与指标端点
//!
//! `/health` 存活、`/ready` 就绪（检查数据库）、`/metrics` Prometheus 文本

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use siteops_adapter_postgres::check_connection;
use siteops_telemetry::{HealthStatus, PrometheusHandle};
use sqlx::PgPool;

/// 无需登录即可访问的运维路径
pub const PUBLIC_OPS_PATHS: [&str; 3] = ["/health", "/ready", "/metrics"];

#[derive(Clone)]
struct HealthState {
    pool: Option<PgPool>,
    metrics: Option<PrometheusHandle>,
}

/// 构建健康检查路由
pub fn health_routes(pool: Option<PgPool>, metrics: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(HealthState { pool, metrics })
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::new()))
}

async fn ready_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let mut status = HealthStatus::new();
    match &state.pool {
        Some(pool) => match check_connection(pool).await {
            Ok(()) => status.add_check("postgres", true, None),
            Err(e) => status.add_check("postgres", false, Some(e.to_string())),
        },
        None => status.add_check("postgres", false, Some("not configured".to_string())),
    }

    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn metrics_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let body = state.metrics.as_ref().map(|h| h.render()).unwrap_or_default();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
