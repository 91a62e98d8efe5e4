//! 应用层

mod auth_service;
mod dashboard_service;
mod purchase_order_service;
mod query_cache;
mod resource_service;
mod stock_service;

pub use auth_service::{AuthService, CodeRequested, SignedIn};
pub use dashboard_service::DashboardService;
pub use purchase_order_service::{CreatedPurchaseOrder, PurchaseOrderService};
pub use query_cache::{QueryCache, QueryKey};
pub use resource_service::{ListQuery, ResourceService};
pub use stock_service::StockService;
