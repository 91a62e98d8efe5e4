//! 行数据的展示字段
//!
//! - 每个 `*_at` 时间戳附加 `*_at_display`（按配置的 UTC 偏移格式化）
//! - 每个 `image_key` 附加 `image_url`

use serde::Serialize;
use serde_json::{Map, Value};
use siteops_common::{PagedResult, format_rfc3339_at_offset};
use siteops_config::{DisplayConfig, StorageConfig};
use siteops_errors::{AppError, AppResult};

const IMAGE_KEY: &str = "image_key";
const IMAGE_URL: &str = "image_url";

#[derive(Debug, Clone)]
pub struct Presenter {
    utc_offset_minutes: i32,
    public_base_url: String,
    bucket: String,
}

impl Presenter {
    pub fn new(display: &DisplayConfig, storage: &StorageConfig) -> Self {
        Self {
            utc_offset_minutes: display.utc_offset_minutes,
            public_base_url: storage.public_base_url.trim_end_matches('/').to_string(),
            bucket: storage.bucket.trim_matches('/').to_string(),
        }
    }

    pub fn present<T: Serialize>(&self, value: &T) -> AppResult<Value> {
        let mut json = serde_json::to_value(value)
            .map_err(|e| AppError::internal(format!("Failed to encode row: {}", e)))?;
        self.decorate(&mut json);
        Ok(json)
    }

    pub fn present_all<T: Serialize>(&self, rows: &[T]) -> AppResult<Vec<Value>> {
        rows.iter().map(|row| self.present(row)).collect()
    }

    pub fn present_page<T: Serialize>(&self, page: PagedResult<T>) -> AppResult<PagedResult<Value>> {
        let items = self.present_all(&page.items)?;
        Ok(PagedResult::new(
            items,
            page.total,
            &siteops_common::Pagination {
                page: page.page,
                page_size: page.page_size,
            },
        ))
    }

    /// 对象存储中图片的公开地址
    pub fn image_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url,
            self.bucket,
            key.trim_start_matches('/')
        )
    }

    fn decorate(&self, value: &mut Value) {
        match value {
            Value::Object(fields) => {
                for nested in fields.values_mut() {
                    self.decorate(nested);
                }
                let extra = self.derived_fields(fields);
                fields.extend(extra);
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.decorate(item)),
            _ => {}
        }
    }

    fn derived_fields(&self, fields: &Map<String, Value>) -> Vec<(String, Value)> {
        let mut extra = Vec::new();
        for (key, value) in fields {
            match (key.as_str(), value) {
                (IMAGE_KEY, Value::String(image_key)) => {
                    extra.push((IMAGE_URL.to_string(), Value::String(self.image_url(image_key))));
                }
                (name, Value::String(raw)) if name.ends_with("_at") => {
                    if let Some(display) = format_rfc3339_at_offset(raw, self.utc_offset_minutes) {
                        extra.push((format!("{}_display", name), Value::String(display)));
                    }
                }
                _ => {}
            }
        }
        extra
    }
}
