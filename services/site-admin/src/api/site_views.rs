//! 首页、站点库存与采购订单路由

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use super::error::ApiResult;
use super::extract::{Body, RecordId};
use super::responses::MutationResponse;
use super::state::AppState;
use crate::domain::tables::{InventoryTransactions, NewPurchaseOrder, PurchaseOrders, StockMovement};
use crate::domain::{DashboardCounts, RecordStore, Table};

pub async fn dashboard<S: RecordStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<Json<DashboardCounts>> {
    let counts = state.dashboard.counts().await?;
    Ok(Json((*counts).clone()))
}

/// 站点各物料的当前库存
pub async fn site_stock<S: RecordStore>(
    State(state): State<AppState<S>>,
    RecordId(site_id): RecordId,
) -> ApiResult<Json<Vec<Value>>> {
    let summary = state.stock.site_stock(site_id).await?;
    Ok(Json(state.presenter.present_all(&summary)?))
}

/// 站点库存流水，最新在前
pub async fn site_log<S: RecordStore>(
    State(state): State<AppState<S>>,
    RecordId(site_id): RecordId,
) -> ApiResult<Json<Vec<Value>>> {
    let log = state.stock.site_log(site_id).await?;
    Ok(Json(state.presenter.present_all(&log)?))
}

pub async fn record_movement<S: RecordStore>(
    State(state): State<AppState<S>>,
    Body(movement): Body<StockMovement>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let row = state.stock.record_movement(movement).await?;
    let data = state.presenter.present(&row)?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created(InventoryTransactions::ENTITY, data)),
    ))
}

/// 订单与明细一起创建
pub async fn create_purchase_order<S: RecordStore>(
    State(state): State<AppState<S>>,
    Body(request): Body<NewPurchaseOrder>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let created = state.purchase_orders.create(request).await?;
    let data = state.presenter.present(&created)?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created(PurchaseOrders::ENTITY, data)),
    ))
}

pub async fn purchase_order_items<S: RecordStore>(
    State(state): State<AppState<S>>,
    RecordId(order_id): RecordId,
) -> ApiResult<Json<Vec<Value>>> {
    let items = state.purchase_orders.items(order_id).await?;
    Ok(Json(state.presenter.present_all(&items)?))
}
