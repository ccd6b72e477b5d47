//! Routers: the admin façade plus common service routes.

pub mod admin;
pub mod common;

pub use admin::{Admin, AdminMode};
pub use common::{common_routes, common_routes_with_ready};
