//! 基础设施资源管理

use std::sync::Arc;

use secrecy::ExposeSecret;
use siteops_adapter_email::{EmailClient, EmailSender};
use siteops_adapter_postgres::{Migration, MigrationManager, PostgresConfig, create_pool};
use siteops_auth_core::TokenService;
use siteops_common::{RetryConfig, is_retryable_error, with_conditional_retry};
use siteops_config::AppConfig;
use siteops_errors::AppResult;
use sqlx::PgPool;
use tracing::info;

/// 基础设施资源容器
///
/// 由 bootstrap 统一初始化，交给服务构建路由
#[derive(Clone)]
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    token_service: Arc<TokenService>,
    email_sender: Arc<dyn EmailSender>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    ///
    /// 仅数据库连接在启动时按退避策略重试瞬时错误
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_conditional_retry(
            &RetryConfig::default(),
            "PostgreSQL connection",
            || create_pool(&pg_config),
            |e| is_retryable_error(&e.to_string()),
        )
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in as i64,
            config.jwt.issuer.clone(),
            config.jwt.audience.clone(),
        ));

        let email_sender: Arc<dyn EmailSender> = Arc::new(EmailClient::new(config.email.clone())?);
        info!(smtp_host = %config.email.smtp_host, "Email client created");

        Ok(Self {
            config,
            postgres_pool,
            token_service,
            email_sender,
        })
    }

    /// 按配置应用内置迁移
    pub async fn run_migrations(&self, migrations: &[Migration]) -> AppResult<()> {
        if !self.config.database.run_migrations {
            info!("Schema migrations disabled");
            return Ok(());
        }
        let result = MigrationManager::new(self.postgres_pool.clone())
            .migrate(migrations)
            .await?;
        info!(
            applied = result.applied_count(),
            skipped = result.skipped.len(),
            "Schema migrations complete"
        );
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    pub fn email_sender(&self) -> Arc<dyn EmailSender> {
        self.email_sender.clone()
    }
}
