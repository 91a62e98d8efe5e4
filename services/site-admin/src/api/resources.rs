//! 通用表资源的处理器

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use siteops_common::{PagedResult, Pagination, SearchTerm};
use uuid::Uuid;

use super::error::ApiResult;
use super::extract::{Body, Params, RecordId};
use super::responses::MutationResponse;
use super::state::AppState;
use crate::application::ListQuery;
use crate::domain::{ListFilter, RecordStore, Table};

/// 列表查询参数：`?q=&site_id=&page=&page_size=`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub site_id: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        Self {
            search: SearchTerm::new(params.q.as_deref()),
            filter: ListFilter {
                site_id: params.site_id,
            },
            pagination: Pagination::new(params.page, params.page_size),
        }
    }
}

pub async fn list<T: Table, S: RecordStore>(
    State(state): State<AppState<S>>,
    Params(params): Params<ListParams>,
) -> ApiResult<Json<PagedResult<Value>>> {
    let page = state.resources.list::<T>(&params.into()).await?;
    Ok(Json(state.presenter.present_page(page)?))
}

pub async fn show<T: Table, S: RecordStore>(
    State(state): State<AppState<S>>,
    RecordId(id): RecordId,
) -> ApiResult<Json<Value>> {
    let row = state.resources.get::<T>(id).await?;
    Ok(Json(state.presenter.present(&row)?))
}

pub async fn create<T: Table, S: RecordStore>(
    State(state): State<AppState<S>>,
    Body(values): Body<T::Insert>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let row = state.resources.create::<T>(values).await?;
    let data = state.presenter.present(&row)?;
    Ok((StatusCode::CREATED, Json(MutationResponse::created(T::ENTITY, data))))
}

pub async fn update<T: Table, S: RecordStore>(
    State(state): State<AppState<S>>,
    RecordId(id): RecordId,
    Body(changes): Body<T::Update>,
) -> ApiResult<Json<MutationResponse>> {
    let row = state.resources.update::<T>(id, changes).await?;
    let data = state.presenter.present(&row)?;
    Ok(Json(MutationResponse::updated(T::ENTITY, data)))
}

pub async fn delete<T: Table, S: RecordStore>(
    State(state): State<AppState<S>>,
    RecordId(id): RecordId,
) -> ApiResult<Json<MutationResponse>> {
    state.resources.delete::<T>(id).await?;
    Ok(Json(MutationResponse::deleted(T::ENTITY, json!({ "id": id }))))
}
