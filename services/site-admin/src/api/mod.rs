//! HTTP 接口层

mod auth;
mod error;
mod extract;
mod gate;
mod presenter;
mod resources;
mod responses;
mod routes;
mod site_views;
mod state;

pub use error::{ApiError, ApiResult};
pub use gate::CurrentUser;
pub use presenter::Presenter;
pub use responses::{MutationResponse, Notice};
pub use routes::build_router;
pub use state::{AppState, Backends};
