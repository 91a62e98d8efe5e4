//! 通用表访问的 PostgreSQL 实现
//!
//! 写入时把 Insert / Update 序列化为 JSON 对象，只有对象中出现的键会成为列；
//! 值经 `jsonb_populate_record` 按表的列类型转换。

use async_trait::async_trait;
use serde::Serialize;
use siteops_adapter_postgres::map_sqlx_error;
use siteops_common::utils::is_sql_identifier;
use siteops_errors::{AppError, AppResult};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ListFilter, RecordStore, Table};

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 取出已设置的列名
pub(crate) fn columns_of<V: Serialize>(values: &V) -> AppResult<(Vec<String>, serde_json::Value)> {
    let json = serde_json::to_value(values)
        .map_err(|e| AppError::internal(format!("Failed to encode record: {}", e)))?;
    let columns: Vec<String> = json
        .as_object()
        .ok_or_else(|| AppError::internal("Record must encode as an object"))?
        .keys()
        .cloned()
        .collect();

    if let Some(bad) = columns.iter().find(|c| !is_sql_identifier(c)) {
        return Err(AppError::validation(format!("Invalid column name: {}", bad)));
    }
    Ok((columns, json))
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn insert_sql(table: &str, columns: &[String]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table);
    }
    let cols = quoted(columns);
    format!(
        "INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) RETURNING *"
    )
}

pub(crate) fn update_sql(table: &str, columns: &[String], touch_updated_at: bool) -> String {
    let mut assignments: Vec<String> = columns
        .iter()
        .map(|c| format!("\"{c}\" = src.\"{c}\""))
        .collect();
    if touch_updated_at {
        assignments.push("updated_at = NOW()".to_string());
    }
    format!(
        "UPDATE {table} AS target SET {} FROM jsonb_populate_record(NULL::{table}, $1) AS src \
         WHERE target.id = $2 RETURNING target.*",
        assignments.join(", ")
    )
}

fn select_sql<T: Table>(filter: &ListFilter, projection: &str, ordered: bool) -> AppResult<String> {
    let mut sql = format!("SELECT {} FROM {}", projection, T::NAME);
    if filter.site_id.is_some() {
        let column = T::SITE_COLUMN.ok_or_else(|| {
            AppError::validation(format!("{} cannot be filtered by site", T::ENTITY))
        })?;
        sql.push_str(&format!(" WHERE {} = $1", column));
    }
    if ordered {
        sql.push_str(&format!(" ORDER BY {}", T::ORDER_BY));
    }
    Ok(sql)
}

/// 在给定连接或事务上插入一行
pub(crate) async fn insert_row<'e, T, E>(executor: E, values: &T::Insert) -> AppResult<T::Row>
where
    T: Table,
    E: PgExecutor<'e>,
{
    let (columns, json) = columns_of(values)?;
    let sql = insert_sql(T::NAME, &columns);
    let query = sqlx::query_as::<_, T::Row>(&sql);
    let query = if columns.is_empty() { query } else { query.bind(Json(json)) };
    query.fetch_one(executor).await.map_err(map_sqlx_error)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list<T: Table>(&self, filter: &ListFilter) -> AppResult<Vec<T::Row>> {
        debug!(table = T::NAME, scope = %filter.scope(), "Listing records");
        let sql = select_sql::<T>(filter, "*", true)?;
        let mut query = sqlx::query_as::<_, T::Row>(&sql);
        if let Some(site_id) = filter.site_id {
            query = query.bind(site_id);
        }
        query.fetch_all(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn find<T: Table>(&self, id: Uuid) -> AppResult<Option<T::Row>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::NAME);
        sqlx::query_as::<_, T::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert<T: Table>(&self, values: &T::Insert) -> AppResult<T::Row> {
        debug!(table = T::NAME, "Inserting record");
        insert_row::<T, _>(&self.pool, values).await
    }

    async fn update<T: Table>(&self, id: Uuid, changes: &T::Update) -> AppResult<T::Row> {
        debug!(table = T::NAME, %id, "Updating record");
        let (columns, json) = columns_of(changes)?;
        if columns.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        let sql = update_sql(T::NAME, &columns, T::TOUCHES_UPDATED_AT);
        sqlx::query_as::<_, T::Row>(&sql)
            .bind(Json(json))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| AppError::not_found(format!("{} not found", T::ENTITY)))
    }

    async fn delete<T: Table>(&self, id: Uuid) -> AppResult<()> {
        debug!(table = T::NAME, %id, "Deleting record");
        let sql = format!("DELETE FROM {} WHERE id = $1", T::NAME);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("{} not found", T::ENTITY)));
        }
        Ok(())
    }

    async fn count<T: Table>(&self, filter: &ListFilter) -> AppResult<i64> {
        let sql = select_sql::<T>(filter, "COUNT(*)", false)?;
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(site_id) = filter.site_id {
            query = query.bind(site_id);
        }
        query.fetch_one(&self.pool).await.map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tables::{Activities, Sites, UserUpdate};

    #[test]
    fn test_insert_sql_uses_only_given_columns() {
        let sql = insert_sql("sites", &["code".to_string(), "name".to_string()]);
        assert_eq!(
            sql,
            "INSERT INTO sites (\"code\", \"name\") SELECT \"code\", \"name\" \
             FROM jsonb_populate_record(NULL::sites, $1) RETURNING *"
        );
        assert_eq!(insert_sql("sessions", &[]), "INSERT INTO sessions DEFAULT VALUES RETURNING *");
    }

    #[test]
    fn test_update_sql_touches_updated_at() {
        let sql = update_sql("users", &["role".to_string()], true);
        assert!(sql.contains("SET \"role\" = src.\"role\", updated_at = NOW()"));
        assert!(sql.ends_with("WHERE target.id = $2 RETURNING target.*"));
        assert!(!update_sql("sessions", &["is_active".to_string()], false).contains("updated_at"));
    }

    #[test]
    fn test_columns_of_skips_unset_fields() {
        let update = UserUpdate {
            role: Some("manager".to_string()),
            ..Default::default()
        };
        let (columns, json) = columns_of(&update).unwrap();
        assert_eq!(columns, vec!["role"]);
        assert_eq!(json["role"], "manager");
    }

    #[test]
    fn test_count_sql() {
        let filter = ListFilter::site(Uuid::nil());
        assert_eq!(
            select_sql::<Activities>(&filter, "COUNT(*)", false).unwrap(),
            "SELECT COUNT(*) FROM activities WHERE site_id = $1"
        );
    }

    #[test]
    fn test_site_filter_on_table_without_site_column() {
        let filter = ListFilter::site(Uuid::nil());
        assert!(select_sql::<Sites>(&filter, "*", true).is_err());
    }
}
