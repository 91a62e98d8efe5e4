//! common - 通用类型和工具库

pub mod retry;
pub mod search;
pub mod time;
pub mod types;
pub mod utils;

pub use retry::*;
pub use search::*;
pub use time::*;
pub use types::*;
