//! Shared application state for all admin routes.

use crate::auth::session::SessionStore;
use crate::auth::token::TokenSigner;
use crate::model::registry::ModelRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Built at startup, immutable afterwards.
    pub registry: Arc<ModelRegistry>,
    pub tokens: Arc<TokenSigner>,
    pub sessions: Arc<SessionStore>,
    /// Mount prefix of the admin surface (e.g. "/admin"); login redirects
    /// are built from it.
    pub admin_prefix: Arc<str>,
}
