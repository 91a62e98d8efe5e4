//! 通用资源服务
//!
//! 列表读取走查询缓存，搜索与分页在取回的集合上进行；写入先校验再提交，
//! 成功后失效相关查询。

use std::sync::Arc;

use serde::Serialize;
use siteops_common::{PagedResult, Pagination, SearchTerm};
use siteops_errors::{AppError, AppResult};
use siteops_telemetry::record_mutation;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::query_cache::{QueryCache, QueryKey};
use crate::domain::{ListFilter, RecordStore, Table, Validate};

/// 列表查询参数
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: SearchTerm,
    pub filter: ListFilter,
    pub pagination: Pagination,
}

pub struct ResourceService<S> {
    store: Arc<S>,
    cache: QueryCache,
}

impl<S: RecordStore> ResourceService<S> {
    pub fn new(store: Arc<S>, cache: QueryCache) -> Self {
        Self { store, cache }
    }

    /// 表的完整集合（经缓存）
    pub async fn rows<T: Table>(&self, filter: &ListFilter) -> AppResult<Arc<Vec<T::Row>>> {
        if filter.site_id.is_some() && T::SITE_COLUMN.is_none() {
            return Err(AppError::validation(format!(
                "{} cannot be filtered by site",
                T::ENTITY
            )));
        }
        let key = QueryKey::new(T::NAME, filter.scope());
        self.cache.get_or_load(key, self.store.list::<T>(filter)).await
    }

    pub async fn list<T: Table>(&self, query: &ListQuery) -> AppResult<PagedResult<T::Row>> {
        let rows = self.rows::<T>(&query.filter).await?;
        let matched: Vec<&T::Row> = rows
            .iter()
            .filter(|row| query.search.matches(T::search_fields(row)))
            .collect();
        debug!(
            table = T::NAME,
            total = rows.len(),
            matched = matched.len(),
            "Listing"
        );
        let items = query
            .pagination
            .slice(&matched)
            .into_iter()
            .cloned()
            .collect();
        Ok(PagedResult::new(items, matched.len() as u64, &query.pagination))
    }

    pub async fn get<T: Table>(&self, id: Uuid) -> AppResult<T::Row> {
        self.store
            .find::<T>(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} not found", T::ENTITY)))
    }

    /// 不经缓存直接计数
    pub async fn count<T: Table>(&self, filter: &ListFilter) -> AppResult<i64> {
        self.store.count::<T>(filter).await
    }

    pub async fn create<T: Table>(&self, values: T::Insert) -> AppResult<T::Row> {
        let result = match values.validate() {
            Ok(()) => self.store.insert::<T>(&values).await,
            Err(e) => Err(e),
        };
        self.finish::<T, _>("create", result).await
    }

    pub async fn update<T: Table>(&self, id: Uuid, changes: T::Update) -> AppResult<T::Row> {
        let result = match ensure_changes(&changes).and_then(|_| changes.validate()) {
            Ok(()) => self.store.update::<T>(id, &changes).await,
            Err(e) => Err(e),
        };
        self.finish::<T, _>("update", result).await
    }

    pub async fn delete<T: Table>(&self, id: Uuid) -> AppResult<()> {
        let result = self.store.delete::<T>(id).await;
        self.finish::<T, _>("delete", result).await
    }

    async fn finish<T: Table, R>(&self, op: &'static str, result: AppResult<R>) -> AppResult<R> {
        record_mutation(T::NAME, op, result.is_ok());
        match &result {
            Ok(_) => {
                info!(table = T::NAME, op, "Mutation succeeded");
                self.cache.invalidate_after_write(T::NAME, T::DEPENDENTS).await;
            }
            Err(e) => warn!(table = T::NAME, op, error = %e, "Mutation rejected"),
        }
        result
    }
}

/// 更新必须至少包含一个字段
fn ensure_changes<V: Serialize>(changes: &V) -> AppResult<()> {
    let json = serde_json::to_value(changes)
        .map_err(|e| AppError::internal(format!("Failed to encode changes: {}", e)))?;
    match json.as_object() {
        Some(fields) if !fields.is_empty() => Ok(()),
        _ => Err(AppError::validation("No fields to update")),
    }
}
