//! Curator SDK: pluggable admin backend over registered models.
//!
//! Register model descriptors in a [`ModelRegistry`], hand it to [`Admin`],
//! and mount the returned router: you get a JSON CRUD API and an HTML
//! dashboard over every registered model, gated by bearer-token and
//! session-cookie authentication respectively.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod serialize;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{Permission, Principal, PrincipalStore, TokenSigner};
pub use error::{AppError, RegistryError};
pub use model::{schema_for, ColumnSpec, ColumnType, ModelRegistry, ModelSpec, RelationKind, RelationSpec};
pub use routes::{common_routes, common_routes_with_ready, Admin, AdminMode};
pub use service::CrudService;
pub use state::AppState;
pub use store::ensure_admin_tables;
