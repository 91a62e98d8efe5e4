//! site-admin - 工地运营管理后台服务
//!
//! 分层：
//! - domain：表定义、库存推导、登录验证码与仓储接口
//! - application：查询缓存与各业务服务
//! - infrastructure：PostgreSQL 实现与内置迁移
//! - api：axum 路由、登录校验与响应格式

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use api::{AppState, Backends, build_router};
