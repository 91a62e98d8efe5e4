//! 集成测试公共设施：内存存储、仓储桩与记录邮件的发送器

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Map, Value, json};
use site_admin::domain::tables::{
    InventoryTransactionRow, OrderLine, PurchaseOrderInsert, PurchaseOrderItemRow,
    PurchaseOrderRow, StockMovement,
};
use site_admin::domain::{
    DashboardCounts, DashboardRepository, InventoryRepository, ListFilter, LoginChallenge,
    LoginChallengeRepository, PurchaseOrderRepository, RecordStore, SiteTransaction, StockSummary,
    Table, apply_movement,
};
use site_admin::{AppState, Backends, build_router};
use siteops_adapter_email::EmailSender;
use siteops_auth_core::TokenService;
use siteops_config::AppConfig;
use siteops_errors::{AppError, AppResult};
use tower::ServiceExt;
use uuid::Uuid;

pub fn test_config() -> AppConfig {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/config");
    AppConfig::from_figment(AppConfig::figment(dir, "test")).expect("test config")
}

// ---------------------------------------------------------------------------
// 内存表存储
// ---------------------------------------------------------------------------

/// 以 JSON 保存各表行数据，行为与数据库一致：
/// 未给出的列取默认值，更新只修改给出的列，列表按创建时间倒序
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    defaults: HashMap<&'static str, Map<String, Value>>,
    fail_writes: AtomicBool,
    pub list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
            .with_default("sites", "status", json!("planning"))
            .with_default("activities", "status", json!("pending"))
            .with_default("material_requests", "status", json!("pending"))
            .with_default("material_requests", "priority", json!("medium"))
            .with_default("bookings", "status", json!("pending"))
            .with_default("users", "role", json!("staff"))
            .with_default("users", "is_active", json!(true))
            .with_default("customer_inquiries", "status", json!("new"))
    }

    pub fn with_default(mut self, table: &'static str, column: &str, value: Value) -> Self {
        self.defaults
            .entry(table)
            .or_default()
            .insert(column.to_string(), value);
        self
    }

    /// 打开后所有写操作返回数据库错误
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn rows_of(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("connection reset by peer"));
        }
        Ok(())
    }
}

fn to_object<V: Serialize>(value: &V) -> Map<String, Value> {
    match serde_json::to_value(value).unwrap() {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn decode<T: Table>(row: &Value) -> AppResult<T::Row> {
    serde_json::from_value(row.clone()).map_err(|e| AppError::internal(e.to_string()))
}

fn not_found<T: Table>() -> AppError {
    AppError::not_found(format!("{} not found", T::ENTITY))
}

fn id_of(row: &Value) -> &str {
    row["id"].as_str().unwrap_or_default()
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list<T: Table>(&self, filter: &ListFilter) -> AppResult<Vec<T::Row>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(T::NAME).cloned().unwrap_or_default();
        rows.iter()
            .rev()
            .filter(|row| match (filter.site_id, T::SITE_COLUMN) {
                (Some(site), Some(column)) => row[column] == json!(site),
                _ => true,
            })
            .map(decode::<T>)
            .collect()
    }

    async fn find<T: Table>(&self, id: Uuid) -> AppResult<Option<T::Row>> {
        let tables = self.tables.lock().unwrap();
        let id = id.to_string();
        tables
            .get(T::NAME)
            .and_then(|rows| rows.iter().find(|row| id_of(row) == id))
            .map(decode::<T>)
            .transpose()
    }

    async fn insert<T: Table>(&self, values: &T::Insert) -> AppResult<T::Row> {
        self.check_writable()?;
        let now = Utc::now();
        let mut row = self.defaults.get(T::NAME).cloned().unwrap_or_default();
        row.insert("id".to_string(), json!(Uuid::now_v7()));
        row.insert("created_at".to_string(), json!(now));
        row.insert("updated_at".to_string(), json!(now));
        row.extend(to_object(values));

        let row = Value::Object(row);
        let decoded = decode::<T>(&row)?;
        self.tables
            .lock()
            .unwrap()
            .entry(T::NAME)
            .or_default()
            .push(row);
        Ok(decoded)
    }

    async fn update<T: Table>(&self, id: Uuid, changes: &T::Update) -> AppResult<T::Row> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let id = id.to_string();
        let row = tables
            .get_mut(T::NAME)
            .and_then(|rows| rows.iter_mut().find(|row| id_of(row) == id))
            .ok_or_else(not_found::<T>)?;
        if let Value::Object(fields) = row {
            fields.extend(to_object(changes));
            if T::TOUCHES_UPDATED_AT {
                fields.insert("updated_at".to_string(), json!(Utc::now()));
            }
        }
        decode::<T>(row)
    }

    async fn delete<T: Table>(&self, id: Uuid) -> AppResult<()> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let id = id.to_string();
        let rows = tables.get_mut(T::NAME).ok_or_else(not_found::<T>)?;
        let before = rows.len();
        rows.retain(|row| id_of(row) != id);
        if rows.len() == before {
            return Err(not_found::<T>());
        }
        if T::NAME == "sites" {
            for child in SITE_CASCADE {
                if let Some(rows) = tables.get_mut(*child) {
                    rows.retain(|row| row["site_id"] != json!(id));
                }
            }
        }
        Ok(())
    }

    async fn count<T: Table>(&self, filter: &ListFilter) -> AppResult<i64> {
        Ok(self.list::<T>(filter).await?.len() as i64)
    }
}

/// 删除站点时数据库级联删除的表
const SITE_CASCADE: &[&str] = &[
    "activities",
    "material_requests",
    "authorized_persons",
    "user_site_assignments",
];

// ---------------------------------------------------------------------------
// 库存仓储桩
// ---------------------------------------------------------------------------

pub struct ItemInfo {
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
}

/// `server_function = false` 模拟数据库中缺少 `site_stock_summary`
pub struct StubInventory {
    pub transactions: Mutex<Vec<SiteTransaction>>,
    pub items: Mutex<HashMap<Uuid, ItemInfo>>,
    server_function: AtomicBool,
    pub server_calls: AtomicUsize,
    pub log_calls: AtomicUsize,
}

impl StubInventory {
    pub fn new(server_function: bool) -> Self {
        Self {
            transactions: Mutex::new(Vec::new()),
            items: Mutex::new(HashMap::new()),
            server_function: AtomicBool::new(server_function),
            server_calls: AtomicUsize::new(0),
            log_calls: AtomicUsize::new(0),
        }
    }

    pub fn add_item(&self, id: Uuid, name: &str, unit: &str) {
        self.items.lock().unwrap().insert(
            id,
            ItemInfo {
                name: name.to_string(),
                category: Some("materials".to_string()),
                unit: unit.to_string(),
            },
        );
    }

    pub fn set_server_function(&self, available: bool) {
        self.server_function.store(available, Ordering::SeqCst);
    }

    /// 直接写入一条流水（不经过库存计算）
    pub fn push(&self, txn: SiteTransaction) {
        self.transactions.lock().unwrap().push(txn);
    }

    fn joined(&self, mut txn: SiteTransaction) -> SiteTransaction {
        if let Some(item) = self.items.lock().unwrap().get(&txn.item_id) {
            txn.item_name = Some(item.name.clone());
            txn.item_category = item.category.clone();
            txn.item_unit = Some(item.unit.clone());
        }
        txn
    }

    fn log_for(&self, site_id: Uuid) -> Vec<SiteTransaction> {
        let mut log: Vec<SiteTransaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.site_id == site_id)
            .cloned()
            .collect();
        site_admin::domain::sort_newest_first(&mut log);
        log.into_iter().map(|t| self.joined(t)).collect()
    }
}

#[async_trait]
impl InventoryRepository for StubInventory {
    /// 按物料分组取最新一条，再按最后更新时间倒序，与数据库函数的语义一致
    async fn server_stock_summary(&self, site_id: Uuid) -> AppResult<Option<Vec<StockSummary>>> {
        self.server_calls.fetch_add(1, Ordering::SeqCst);
        if !self.server_function.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let mut latest: HashMap<Uuid, SiteTransaction> = HashMap::new();
        for txn in self.log_for(site_id) {
            latest
                .entry(txn.item_id)
                .and_modify(|current| {
                    if (txn.created_at, txn.id) > (current.created_at, current.id) {
                        *current = txn.clone();
                    }
                })
                .or_insert(txn);
        }
        let mut rows: Vec<SiteTransaction> = latest.into_values().collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(Some(
            rows.into_iter()
                .map(|t| StockSummary {
                    item_id: t.item_id,
                    item_name: t.item_name,
                    item_category: t.item_category,
                    item_unit: t.item_unit,
                    current_stock: t.new_stock,
                    last_updated: t.created_at,
                })
                .collect(),
        ))
    }

    async fn site_transactions(&self, site_id: Uuid) -> AppResult<Vec<SiteTransaction>> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.log_for(site_id))
    }

    async fn record_movement(&self, movement: &StockMovement) -> AppResult<InventoryTransactionRow> {
        let mut transactions = self.transactions.lock().unwrap();
        let previous = transactions
            .iter()
            .filter(|t| t.site_id == movement.site_id && t.item_id == movement.item_id)
            .max_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)))
            .map(|t| t.new_stock)
            .unwrap_or(Decimal::ZERO);
        let new_stock = apply_movement(previous, movement.transaction_type, movement.quantity)?;

        let row = InventoryTransactionRow {
            id: Uuid::now_v7(),
            item_id: movement.item_id,
            site_id: movement.site_id,
            transaction_type: movement.transaction_type,
            quantity: movement.quantity,
            previous_stock: previous,
            new_stock,
            notes: movement.notes.clone(),
            created_by: movement.created_by,
            created_at: Utc::now(),
        };
        transactions.push(SiteTransaction {
            id: row.id,
            item_id: row.item_id,
            site_id: row.site_id,
            transaction_type: row.transaction_type,
            quantity: row.quantity,
            previous_stock: row.previous_stock,
            new_stock: row.new_stock,
            notes: row.notes.clone(),
            created_by: row.created_by,
            created_at: row.created_at,
            item_name: None,
            item_category: None,
            item_unit: None,
        });
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// 采购订单仓储桩
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubPurchaseOrders {
    pub orders: Mutex<Vec<PurchaseOrderRow>>,
    pub items: Mutex<Vec<PurchaseOrderItemRow>>,
}

#[async_trait]
impl PurchaseOrderRepository for StubPurchaseOrders {
    async fn create_with_items(
        &self,
        order: &PurchaseOrderInsert,
        lines: &[OrderLine],
    ) -> AppResult<(PurchaseOrderRow, Vec<PurchaseOrderItemRow>)> {
        let now = Utc::now();
        let row = PurchaseOrderRow {
            id: Uuid::now_v7(),
            po_number: order.po_number.clone(),
            vendor_id: order.vendor_id,
            site_id: order.site_id,
            status: order.status.clone().unwrap_or_else(|| "draft".to_string()),
            total_amount: order.total_amount.unwrap_or(Decimal::ZERO),
            order_date: order.order_date.unwrap_or_else(|| now.date_naive()),
            expected_date: order.expected_date,
            notes: order.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        let items: Vec<PurchaseOrderItemRow> = lines
            .iter()
            .map(|line| {
                let insert = line.for_order(row.id);
                PurchaseOrderItemRow {
                    id: Uuid::now_v7(),
                    purchase_order_id: insert.purchase_order_id,
                    item_id: insert.item_id,
                    description: insert.description,
                    quantity: insert.quantity,
                    unit_price: insert.unit_price,
                    created_at: now,
                }
            })
            .collect();

        self.orders.lock().unwrap().push(row.clone());
        self.items.lock().unwrap().extend(items.iter().cloned());
        Ok((row, items))
    }

    async fn items_for(&self, purchase_order_id: Uuid) -> AppResult<Vec<PurchaseOrderItemRow>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.purchase_order_id == purchase_order_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// 登录验证码仓储桩
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubChallenges {
    pub challenges: Mutex<Vec<LoginChallenge>>,
    pub calls: AtomicUsize,
    /// 读取后让出执行权，使并发请求都基于同一份旧状态继续
    pub yield_after_read: AtomicBool,
}

impl StubChallenges {
    pub fn set_yield_after_read(&self, on: bool) {
        self.yield_after_read.store(on, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LoginChallengeRepository for StubChallenges {
    async fn create(&self, challenge: &LoginChallenge) -> AppResult<()> {
        self.touch();
        self.challenges.lock().unwrap().push(challenge.clone());
        Ok(())
    }

    async fn count_since(&self, email: &str, since: DateTime<Utc>) -> AppResult<i64> {
        self.touch();
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email == email && c.created_at >= since)
            .count() as i64)
    }

    async fn latest_pending(&self, email: &str) -> AppResult<Option<LoginChallenge>> {
        self.touch();
        let pending = self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email == email && c.verified_at.is_none())
            .max_by_key(|c| (c.created_at, c.id))
            .cloned();
        if self.yield_after_read.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        Ok(pending)
    }

    async fn record_failed_attempt(&self, id: Uuid, max_attempts: i32) -> AppResult<Option<i32>> {
        self.touch();
        let mut challenges = self.challenges.lock().unwrap();
        Ok(challenges
            .iter_mut()
            .find(|c| c.id == id && c.attempts < max_attempts)
            .map(|c| {
                c.attempts += 1;
                c.attempts
            }))
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>, max_attempts: i32) -> AppResult<bool> {
        self.touch();
        let mut challenges = self.challenges.lock().unwrap();
        match challenges
            .iter_mut()
            .find(|c| c.id == id && c.verified_at.is_none() && c.attempts < max_attempts)
        {
            Some(c) => {
                c.verified_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// 首页统计桩
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubDashboard {
    pub calls: AtomicUsize,
}

#[async_trait]
impl DashboardRepository for StubDashboard {
    async fn counts(&self) -> AppResult<DashboardCounts> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DashboardCounts {
            users: 4,
            sites: 2,
            active_sites: 1,
            ..Default::default()
        })
    }
}

// ---------------------------------------------------------------------------
// 邮件
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// 最近一封邮件中的 6 位验证码
    pub fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let text = &sent.last()?.text;
        text.split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == 6)
            .map(str::to_string)
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: body.to_string(),
        });
        Ok(())
    }

    async fn send_html_email(
        &self,
        to: &str,
        subject: &str,
        _html_body: &str,
        text_body: &str,
    ) -> AppResult<()> {
        self.send_text_email(to, subject, text_body).await
    }
}

// ---------------------------------------------------------------------------
// 测试应用
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState<MemoryStore>,
    pub store: Arc<MemoryStore>,
    pub inventory: Arc<StubInventory>,
    pub purchase_orders: Arc<StubPurchaseOrders>,
    pub challenges: Arc<StubChallenges>,
    pub dashboard: Arc<StubDashboard>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_inventory(StubInventory::new(true))
    }

    pub fn with_inventory(inventory: StubInventory) -> Self {
        let config = test_config();
        let tokens = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in as i64,
            config.jwt.issuer.clone(),
            config.jwt.audience.clone(),
        ));

        let store = Arc::new(MemoryStore::new());
        let inventory = Arc::new(inventory);
        let purchase_orders = Arc::new(StubPurchaseOrders::default());
        let challenges = Arc::new(StubChallenges::default());
        let dashboard = Arc::new(StubDashboard::default());
        let mailer = Arc::new(RecordingMailer::default());

        let backends = Backends {
            store: store.clone(),
            inventory: inventory.clone(),
            purchase_orders: purchase_orders.clone(),
            login_challenges: challenges.clone(),
            dashboard: dashboard.clone(),
            mailer: mailer.clone(),
        };
        let state = AppState::new(backends, tokens.clone(), &config).expect("app state");

        Self {
            router: build_router(state.clone()),
            state,
            store,
            inventory,
            purchase_orders,
            challenges,
            dashboard,
            mailer,
            tokens,
        }
    }

    pub fn token(&self) -> String {
        self.tokens.generate_access_token("admin@example.com").unwrap()
    }

    /// 发送请求，返回状态码与 JSON 响应体
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let token = self.token();
        self.call("GET", uri, Some(&token), None).await
    }

    pub async fn send(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.token();
        self.call(method, uri, Some(&token), Some(body)).await
    }
}
