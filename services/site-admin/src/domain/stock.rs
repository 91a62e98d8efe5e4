//! 站点库存
//!
//! 库存流水是追加写入的日志；每个物料的当前库存即其最新一条流水的 `new_stock`。

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteops_errors::{AppError, AppResult};
use uuid::Uuid;

/// 流水类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inventory_transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Adjustment => "adjustment",
        }
    }
}

/// 站点流水（附带物料信息）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteTransaction {
    pub id: Uuid,
    pub item_id: Uuid,
    pub site_id: Uuid,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub item_name: Option<String>,
    pub item_category: Option<String>,
    pub item_unit: Option<String>,
}

/// 物料在站点的最新库存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockSummary {
    pub item_id: Uuid,
    pub item_name: Option<String>,
    pub item_category: Option<String>,
    pub item_unit: Option<String>,
    pub current_stock: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// 物料 ID → 最新库存，按首次出现的顺序迭代
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockSummaryMap {
    entries: Vec<StockSummary>,
    index: HashMap<Uuid, usize>,
}

impl StockSummaryMap {
    pub fn get(&self, item_id: &Uuid) -> Option<&StockSummary> {
        self.index.get(item_id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockSummary> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<StockSummary> {
        self.entries
    }

    fn insert_if_absent(&mut self, summary: StockSummary) {
        if !self.index.contains_key(&summary.item_id) {
            self.index.insert(summary.item_id, self.entries.len());
            self.entries.push(summary);
        }
    }
}

impl FromIterator<StockSummary> for StockSummaryMap {
    /// 同一物料只保留第一条
    fn from_iter<I: IntoIterator<Item = StockSummary>>(iter: I) -> Self {
        let mut map = Self::default();
        for summary in iter {
            map.insert_if_absent(summary);
        }
        map
    }
}

impl Serialize for StockSummaryMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// 由按时间倒序排列的流水推导每个物料的最新库存
///
/// 单次遍历，每个物料取第一次遇到的流水。
pub fn summarize(transactions: &[SiteTransaction]) -> StockSummaryMap {
    transactions
        .iter()
        .map(|t| StockSummary {
            item_id: t.item_id,
            item_name: t.item_name.clone(),
            item_category: t.item_category.clone(),
            item_unit: t.item_unit.clone(),
            current_stock: t.new_stock,
            last_updated: t.created_at,
        })
        .collect()
}

/// 流水的全序：`created_at` 倒序，同一时刻按 `id` 倒序
pub fn newest_first(a: &SiteTransaction, b: &SiteTransaction) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

pub fn sort_newest_first(transactions: &mut [SiteTransaction]) {
    transactions.sort_by(newest_first);
}

/// 根据变动前库存计算变动后库存
pub fn apply_movement(
    previous: Decimal,
    kind: TransactionType,
    quantity: Decimal,
) -> AppResult<Decimal> {
    match kind {
        TransactionType::In => Ok(previous + quantity),
        TransactionType::Out if quantity > previous => Err(AppError::validation(format!(
            "Insufficient stock: {} available, {} requested",
            previous.normalize(),
            quantity.normalize()
        ))),
        TransactionType::Out => Ok(previous - quantity),
        TransactionType::Adjustment => Ok(quantity),
    }
}
