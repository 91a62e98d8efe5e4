//! 应用状态

use std::sync::Arc;

use siteops_adapter_email::{EmailSender, EmailTemplate};
use siteops_auth_core::TokenService;
use siteops_bootstrap::Infrastructure;
use siteops_config::AppConfig;
use siteops_errors::AppResult;

use super::presenter::Presenter;
use crate::application::{
    AuthService, DashboardService, PurchaseOrderService, QueryCache, ResourceService, StockService,
};
use crate::domain::{
    DashboardRepository, InventoryRepository, LoginChallengeRepository, PurchaseOrderRepository,
    RecordStore,
};
use crate::infrastructure::persistence::{
    PgDashboardRepository, PgInventoryRepository, PgLoginChallengeRepository,
    PgPurchaseOrderRepository, PgRecordStore,
};

/// 服务依赖的存储与外部接口
pub struct Backends<S> {
    pub store: Arc<S>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub purchase_orders: Arc<dyn PurchaseOrderRepository>,
    pub login_challenges: Arc<dyn LoginChallengeRepository>,
    pub dashboard: Arc<dyn DashboardRepository>,
    pub mailer: Arc<dyn EmailSender>,
}

pub struct AppState<S> {
    pub resources: Arc<ResourceService<S>>,
    pub stock: Arc<StockService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub auth: Arc<AuthService>,
    pub dashboard: Arc<DashboardService>,
    pub presenter: Arc<Presenter>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            resources: self.resources.clone(),
            stock: self.stock.clone(),
            purchase_orders: self.purchase_orders.clone(),
            auth: self.auth.clone(),
            dashboard: self.dashboard.clone(),
            presenter: self.presenter.clone(),
        }
    }
}

impl<S: RecordStore> AppState<S> {
    /// 所有服务共享同一个查询缓存
    pub fn new(backends: Backends<S>, tokens: Arc<TokenService>, config: &AppConfig) -> AppResult<Self> {
        let cache = QueryCache::new(&config.cache);
        let auth = AuthService::new(
            backends.login_challenges,
            backends.mailer,
            EmailTemplate::builtin()?,
            tokens,
            config.otp.clone(),
        );

        Ok(Self {
            resources: Arc::new(ResourceService::new(backends.store, cache.clone())),
            stock: Arc::new(StockService::new(backends.inventory, cache.clone())),
            purchase_orders: Arc::new(PurchaseOrderService::new(
                backends.purchase_orders,
                cache.clone(),
            )),
            auth: Arc::new(auth),
            dashboard: Arc::new(DashboardService::new(backends.dashboard, cache)),
            presenter: Arc::new(Presenter::new(&config.display, &config.storage)),
        })
    }
}

impl AppState<PgRecordStore> {
    pub fn from_infrastructure(infra: &Infrastructure) -> AppResult<Self> {
        let pool = infra.postgres_pool();
        let backends = Backends {
            store: Arc::new(PgRecordStore::new(pool.clone())),
            inventory: Arc::new(PgInventoryRepository::new(pool.clone())),
            purchase_orders: Arc::new(PgPurchaseOrderRepository::new(pool.clone())),
            login_challenges: Arc::new(PgLoginChallengeRepository::new(pool.clone())),
            dashboard: Arc::new(PgDashboardRepository::new(pool)),
            mailer: infra.email_sender(),
        };
        Self::new(backends, infra.token_service(), infra.config())
    }
}
