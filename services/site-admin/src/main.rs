//! site-admin 服务入口

use site_admin::infrastructure::persistence::migrations;
use site_admin::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    siteops_bootstrap::run_http("config", |infra| async move {
        infra.run_migrations(&migrations()).await?;
        let state = AppState::from_infrastructure(&infra)?;
        Ok(build_router(state))
    })
    .await
}
