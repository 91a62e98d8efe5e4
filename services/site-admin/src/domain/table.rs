//! 表描述
//!
//! 每张表给出 Row / Insert / Update 三种形状，以及列表、搜索、缓存失效所需的元数据。
//! Insert / Update 序列化时省略未设置的字段，存储层只写入调用方给出的列。

use serde::Serialize;
use serde::de::DeserializeOwned;
use siteops_errors::AppResult;
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// 提交前的字段校验
pub trait Validate {
    fn validate(&self) -> AppResult<()>;
}

/// 表描述
pub trait Table: Send + Sync + 'static {
    /// 表名
    const NAME: &'static str;
    /// 提示信息中的实体名，如 "Site"
    const ENTITY: &'static str;
    /// 列表排序
    const ORDER_BY: &'static str = "created_at DESC, id DESC";
    /// 按站点过滤时使用的列
    const SITE_COLUMN: Option<&'static str> = None;
    /// 表有 `updated_at` 列时，更新会刷新它
    const TOUCHES_UPDATED_AT: bool = true;
    /// 依赖本表数据的表与派生查询（含外键级联删除或置空的表），写入成功后一起失效
    const DEPENDENTS: &'static [&'static str] = &[];

    type Row: Serialize
        + DeserializeOwned
        + for<'r> FromRow<'r, PgRow>
        + Clone
        + Send
        + Sync
        + Unpin
        + 'static;
    type Insert: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;
    type Update: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    fn id(row: &Self::Row) -> Uuid;

    /// 参与搜索的字段
    fn search_fields(row: &Self::Row) -> Vec<&str>;
}

/// 列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub site_id: Option<Uuid>,
}

impl ListFilter {
    pub fn site(site_id: Uuid) -> Self {
        Self {
            site_id: Some(site_id),
        }
    }

    /// 缓存键中的范围部分
    pub fn scope(&self) -> String {
        match self.site_id {
            Some(id) => format!("site:{}", id),
            None => String::new(),
        }
    }
}

/// 把可选字段依次加入搜索字段列表
pub(crate) fn fields<'a>(
    required: impl IntoIterator<Item = &'a str>,
    optional: impl IntoIterator<Item = &'a Option<String>>,
) -> Vec<&'a str> {
    let mut out: Vec<&str> = required.into_iter().collect();
    out.extend(optional.into_iter().filter_map(|f| f.as_deref()));
    out
}

/// 派生查询：站点库存汇总
pub const SITE_STOCK: &str = "site_stock";
/// 派生查询：站点库存流水（含物料信息）
pub const SITE_LOG: &str = "site_inventory_log";
/// 派生查询：首页统计
pub const DASHBOARD: &str = "dashboard";
