//! siteops-bootstrap - 统一服务启动骨架
//!
//! 配置 → 运行时 → 基础设施 → HTTP 服务器

mod health;
mod infrastructure;
mod runtime;
mod starter;

pub use health::*;
pub use infrastructure::*;
pub use runtime::*;
pub use starter::*;
