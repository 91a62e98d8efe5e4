//! 表定义

mod activities;
mod authorized_persons;
mod bookings;
mod customer_inquiries;
mod employee_otps;
mod inventory;
mod material_requests;
mod message_logs;
mod purchase_orders;
mod sessions;
mod sites;
mod user_site_assignments;
mod users;
mod vendors;

pub use activities::*;
pub use authorized_persons::*;
pub use bookings::*;
pub use customer_inquiries::*;
pub use employee_otps::*;
pub use inventory::*;
pub use material_requests::*;
pub use message_logs::*;
pub use purchase_orders::*;
pub use sessions::*;
pub use sites::*;
pub use user_site_assignments::*;
pub use users::*;
pub use vendors::*;

/// 用户与站点分配共用的角色
pub const ROLES: &[&str] = &["admin", "manager", "supervisor", "engineer", "staff"];
