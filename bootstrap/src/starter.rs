//! 服务启动器

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use http::HeaderValue;
use siteops_config::{AppConfig, ServerConfig};
use siteops_errors::AppResult;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::health::health_routes;
use crate::infrastructure::Infrastructure;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 1. 加载 `.env` 与配置
/// 2. 初始化日志与 Prometheus 记录器
/// 3. 创建基础设施资源
/// 4. 调用 `router_builder` 构建业务路由，并合并健康检查路由
/// 5. 启动服务器并处理 graceful shutdown
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     siteops_bootstrap::run_http("config", |infra| async move {
///         Ok(build_router(AppState::from_infrastructure(&infra)))
///     })
///     .await
/// }
/// ```
pub async fn run_http<F, Fut>(
    config_dir: &str,
    router_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);
    info!("Starting {} service", config.app_name);

    let metrics = match siteops_telemetry::init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics exporter disabled");
            None
        }
    };

    let infra = Infrastructure::from_config(config.clone()).await?;
    let pool = infra.postgres_pool();

    let app = router_builder(infra)
        .await?
        .merge(health_routes(Some(pool), metrics))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");
    Ok(())
}

/// 未配置来源时放开跨域（开发环境）
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(origins: &[&str]) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
            body_limit_bytes: 1024,
        }
    }

    #[test]
    fn test_cors_layer_builds() {
        let _ = cors_layer(&server(&[]));
        let _ = cors_layer(&server(&["https://admin.example.com", "bad\norigin"]));
    }
}
