//! 查询缓存
//!
//! 按查询标识（表 + 范围）缓存集合；同一键的并发加载只执行一次。
//! 写入成功后按表失效，失败的写入不触碰缓存。

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use siteops_config::CacheConfig;
use siteops_errors::{AppError, AppResult};
use siteops_telemetry::record_cache_invalidation;
use tracing::debug;

use crate::domain::DASHBOARD;

type CachedValue = Arc<dyn Any + Send + Sync>;

/// 查询标识
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub table: &'static str,
    pub scope: String,
}

impl QueryKey {
    pub fn new(table: &'static str, scope: impl Into<String>) -> Self {
        Self {
            table,
            scope: scope.into(),
        }
    }
}

#[derive(Clone)]
pub struct QueryCache {
    inner: MokaCache<QueryKey, CachedValue>,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        Self { inner }
    }

    /// 命中则返回缓存值，否则执行 `loader` 并缓存成功的结果
    pub async fn get_or_load<V, F>(&self, key: QueryKey, loader: F) -> AppResult<Arc<V>>
    where
        V: Send + Sync + 'static,
        F: Future<Output = AppResult<V>>,
    {
        let table = key.table;
        let value = self
            .inner
            .try_get_with(key, async move {
                debug!(table, "Query cache miss");
                loader.await.map(|v| Arc::new(v) as CachedValue)
            })
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())?;

        value
            .downcast::<V>()
            .map_err(|_| AppError::internal(format!("Cached value type mismatch for {}", table)))
    }

    /// 失效给定表的所有查询
    pub async fn invalidate_tables(&self, tables: &[&str]) -> usize {
        let stale: Vec<QueryKey> = self
            .inner
            .iter()
            .filter(|(key, _)| tables.contains(&key.table))
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in &stale {
            self.inner.invalidate(key).await;
        }
        debug!(?tables, invalidated = stale.len(), "Query cache invalidated");
        stale.len()
    }

    /// 表写入成功后：失效该表、依赖它的派生查询以及首页统计
    pub async fn invalidate_after_write(&self, table: &'static str, dependents: &[&'static str]) {
        let mut tables = vec![table, DASHBOARD];
        tables.extend_from_slice(dependents);
        self.invalidate_tables(&tables).await;
        record_cache_invalidation(table);
    }

    #[cfg(test)]
    fn contains(&self, key: &QueryKey) -> bool {
        self.inner.contains_key(key)
    }
}
