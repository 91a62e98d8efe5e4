//! 路由表

use axum::{
    Router,
    http::Uri,
    middleware,
    routing::{MethodRouter, get, post},
};
use siteops_errors::AppError;

use super::error::ApiError;
use super::state::AppState;
use super::{auth, gate, resources, site_views};
use crate::domain::tables::*;
use crate::domain::{RecordStore, Table};

/// 资源允许的写操作
#[derive(Debug, Clone, Copy)]
struct Capabilities {
    create: bool,
    update: bool,
    delete: bool,
}

const FULL: Capabilities = Capabilities {
    create: true,
    update: true,
    delete: true,
};
const DELETE_ONLY: Capabilities = Capabilities {
    create: false,
    update: false,
    delete: true,
};
const UPDATE_DELETE: Capabilities = Capabilities {
    create: false,
    update: true,
    delete: true,
};
const CREATE_DELETE: Capabilities = Capabilities {
    create: true,
    update: false,
    delete: true,
};
const READ_ONLY: Capabilities = Capabilities {
    create: false,
    update: false,
    delete: false,
};

/// `GET /path`，可选 `POST /path`
fn collection<T: Table, S: RecordStore>(caps: Capabilities) -> MethodRouter<AppState<S>> {
    let route = get(resources::list::<T, S>);
    if caps.create {
        route.post(resources::create::<T, S>)
    } else {
        route
    }
}

/// `GET /path/{id}`，可选 `PATCH` / `DELETE`
fn member<T: Table, S: RecordStore>(caps: Capabilities) -> MethodRouter<AppState<S>> {
    let mut route = get(resources::show::<T, S>);
    if caps.update {
        route = route.patch(resources::update::<T, S>);
    }
    if caps.delete {
        route = route.delete(resources::delete::<T, S>);
    }
    route
}

fn resource<T: Table, S: RecordStore>(
    router: Router<AppState<S>>,
    path: &str,
    caps: Capabilities,
) -> Router<AppState<S>> {
    router
        .route(path, collection::<T, S>(caps))
        .route(&format!("{}/{{id}}", path), member::<T, S>(caps))
}

/// 构建业务路由
///
/// `/auth/otp` 与 `/auth/verify` 公开，其余路径（包括 404）均需登录。
pub fn build_router<S: RecordStore>(state: AppState<S>) -> Router {
    let public = Router::new()
        .route("/auth/otp", post(auth::request_code::<S>))
        .route("/auth/verify", post(auth::verify_code::<S>));

    let mut protected = Router::new()
        .route("/", get(site_views::dashboard::<S>))
        .route("/auth/me", get(auth::me))
        .route("/auth/sign-out", post(auth::sign_out));

    protected = resource::<Users, S>(protected, "/users", FULL);
    protected = resource::<Sites, S>(protected, "/sites", FULL);
    protected = resource::<Activities, S>(protected, "/activities", FULL);
    protected = resource::<MaterialRequests, S>(protected, "/material-requests", FULL);
    protected = resource::<Bookings, S>(protected, "/bookings", FULL);
    protected = resource::<MessageLogs, S>(protected, "/message-logs", DELETE_ONLY);
    protected = resource::<Sessions, S>(protected, "/sessions", UPDATE_DELETE);
    protected = resource::<EmployeeOtps, S>(protected, "/employee-otps", DELETE_ONLY);
    protected = resource::<InventoryItems, S>(protected, "/inventory-items", FULL);
    protected = resource::<Vendors, S>(protected, "/vendors", FULL);
    protected = resource::<AuthorizedPersons, S>(protected, "/authorized-persons", FULL);
    protected = resource::<UserSiteAssignments, S>(protected, "/user-site-assignments", CREATE_DELETE);
    protected = resource::<CustomerInquiries, S>(protected, "/customer-inquiries", UPDATE_DELETE);

    let protected = protected
        .route(
            "/inventory-transactions",
            collection::<InventoryTransactions, S>(READ_ONLY)
                .post(site_views::record_movement::<S>),
        )
        .route(
            "/inventory-transactions/{id}",
            member::<InventoryTransactions, S>(READ_ONLY),
        )
        .route(
            "/purchase-orders",
            collection::<PurchaseOrders, S>(READ_ONLY)
                .post(site_views::create_purchase_order::<S>),
        )
        .route(
            "/purchase-orders/{id}",
            member::<PurchaseOrders, S>(UPDATE_DELETE),
        )
        .route(
            "/purchase-orders/{id}/items",
            get(site_views::purchase_order_items::<S>),
        )
        .route("/sites/{id}/stock", get(site_views::site_stock::<S>))
        .route(
            "/sites/{id}/inventory-transactions",
            get(site_views::site_log::<S>),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_session::<S>,
        ));

    public.merge(protected).with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::at(AppError::not_found("No route for this path"), uri.path())
}
