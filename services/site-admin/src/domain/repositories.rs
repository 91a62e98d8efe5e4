//! 仓储接口

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use siteops_errors::AppResult;
use uuid::Uuid;

use crate::domain::login_challenge::LoginChallenge;
use crate::domain::stock::{SiteTransaction, StockSummary};
use crate::domain::table::{ListFilter, Table};
use crate::domain::tables::{
    InventoryTransactionRow, OrderLine, PurchaseOrderInsert, PurchaseOrderItemRow, PurchaseOrderRow,
    StockMovement,
};

/// 通用表访问
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn list<T: Table>(&self, filter: &ListFilter) -> AppResult<Vec<T::Row>>;

    async fn find<T: Table>(&self, id: Uuid) -> AppResult<Option<T::Row>>;

    async fn insert<T: Table>(&self, values: &T::Insert) -> AppResult<T::Row>;

    /// 只修改给出的列；记录不存在时返回 NotFound
    async fn update<T: Table>(&self, id: Uuid, changes: &T::Update) -> AppResult<T::Row>;

    /// 记录不存在时返回 NotFound
    async fn delete<T: Table>(&self, id: Uuid) -> AppResult<()>;

    async fn count<T: Table>(&self, filter: &ListFilter) -> AppResult<i64>;
}

/// 库存仓储
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// 调用数据库端汇总函数；函数不存在时返回 `None`
    async fn server_stock_summary(&self, site_id: Uuid) -> AppResult<Option<Vec<StockSummary>>>;

    /// 站点流水，按 `created_at DESC, id DESC` 排列
    async fn site_transactions(&self, site_id: Uuid) -> AppResult<Vec<SiteTransaction>>;

    /// 在单个事务内读取上一次库存、计算并写入新流水
    async fn record_movement(&self, movement: &StockMovement) -> AppResult<InventoryTransactionRow>;
}

/// 采购订单仓储
#[async_trait]
pub trait PurchaseOrderRepository: Send + Sync {
    /// 订单与明细在同一事务内写入
    async fn create_with_items(
        &self,
        order: &PurchaseOrderInsert,
        lines: &[OrderLine],
    ) -> AppResult<(PurchaseOrderRow, Vec<PurchaseOrderItemRow>)>;

    async fn items_for(&self, purchase_order_id: Uuid) -> AppResult<Vec<PurchaseOrderItemRow>>;
}

/// 登录验证码仓储
#[async_trait]
pub trait LoginChallengeRepository: Send + Sync {
    async fn create(&self, challenge: &LoginChallenge) -> AppResult<()>;

    /// 指定时间之后为该邮箱签发的验证码数量
    async fn count_since(&self, email: &str, since: DateTime<Utc>) -> AppResult<i64>;

    /// 最近一条未使用的验证码
    async fn latest_pending(&self, email: &str) -> AppResult<Option<LoginChallenge>>;

    /// 尝试次数未达上限时加一并返回新的次数；已达上限返回 None
    async fn record_failed_attempt(&self, id: Uuid, max_attempts: i32) -> AppResult<Option<i32>>;

    /// 仅当验证码未使用且未达尝试上限时标记为已使用，返回是否标记成功
    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>, max_attempts: i32) -> AppResult<bool>;
}

/// 首页统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DashboardCounts {
    pub users: i64,
    pub sites: i64,
    pub active_sites: i64,
    pub activities: i64,
    pub pending_material_requests: i64,
    pub bookings: i64,
    pub upcoming_bookings: i64,
    pub failed_messages: i64,
}

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn counts(&self) -> AppResult<DashboardCounts>;
}
