//! 领域层

pub mod login_challenge;
pub mod repositories;
pub mod stock;
pub mod table;
pub mod tables;
pub mod validate;

pub use login_challenge::*;
pub use repositories::*;
pub use stock::*;
pub use table::*;
