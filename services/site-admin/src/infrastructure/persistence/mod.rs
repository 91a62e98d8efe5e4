//! PostgreSQL 持久化实现

mod dashboard;
mod inventory;
mod login_challenges;
mod purchase_orders;
mod record_store;

pub use dashboard::PgDashboardRepository;
pub use inventory::PgInventoryRepository;
pub use login_challenges::PgLoginChallengeRepository;
pub use purchase_orders::PgPurchaseOrderRepository;
pub use record_store::PgRecordStore;

/// 内置 schema 迁移
pub fn migrations() -> Vec<siteops_adapter_postgres::Migration> {
    vec![siteops_adapter_postgres::Migration::new(
        1,
        "schema",
        include_str!("../../../migrations/0001_schema.sql"),
    )]
}
