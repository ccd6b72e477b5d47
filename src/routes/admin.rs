//! Admin façade: assembles the API and UI front-ends under a mount prefix.

use crate::auth::principal::user_spec;
use crate::auth::session::SessionStore;
use crate::auth::token::TokenSigner;
use crate::error::RegistryError;
use crate::handlers::{api, ui};
use crate::model::registry::ModelRegistry;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Which front-ends to mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminMode {
    Api,
    Ui,
    Both,
}

/// Builder wiring a model registry into the admin surface.
///
/// Mounting registers the built-in user model in the registry, so user rows
/// are served by the same generic machinery as any other model.
pub struct Admin {
    registry: ModelRegistry,
    secret: Vec<u8>,
    mode: AdminMode,
    prefix: String,
    token_expiration: Option<i64>,
}

impl Admin {
    pub fn new(registry: ModelRegistry, secret: &[u8]) -> Self {
        Admin {
            registry,
            secret: secret.to_vec(),
            mode: AdminMode::Both,
            prefix: "/admin".to_string(),
            token_expiration: None,
        }
    }

    pub fn mode(mut self, mode: AdminMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mount prefix, e.g. "/admin" (leading slash, no trailing slash).
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Token validity window in seconds (default one week).
    pub fn token_expiration(mut self, secs: i64) -> Self {
        self.token_expiration = Some(secs);
        self
    }

    /// Build the mounted router and its state.
    pub fn into_router(self, pool: PgPool) -> Result<(Router, AppState), RegistryError> {
        let mut registry = self.registry;
        registry.register(user_spec())?;

        let mut signer = TokenSigner::new(&self.secret);
        if let Some(secs) = self.token_expiration {
            signer = signer.with_expiration(secs);
        }
        let state = AppState {
            pool,
            registry: Arc::new(registry),
            tokens: Arc::new(signer),
            sessions: Arc::new(SessionStore::new()),
            admin_prefix: Arc::from(self.prefix.as_str()),
        };

        let mut mounted = Router::new();
        if matches!(self.mode, AdminMode::Api | AdminMode::Both) {
            mounted = mounted.nest("/api", api_routes(state.clone()));
        }
        if matches!(self.mode, AdminMode::Ui | AdminMode::Both) {
            mounted = mounted.merge(ui_routes(state.clone()));
        }
        let router = Router::new()
            .nest(&self.prefix, mounted)
            .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024));
        Ok((router, state))
    }
}

/// JSON CRUD surface: token issuance, user routes, generic model routes.
fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/token", post(api::issue_token))
        .route("/user", post(api::create_user))
        .route(
            "/user/:id",
            get(api::read_user)
                .put(api::update_user)
                .delete(api::delete_user),
        )
        .route("/schema/:model", get(api::model_schema))
        .route("/:model", post(api::create_model))
        .route(
            "/:model/:id",
            get(api::read_model)
                .put(api::update_model)
                .delete(api::delete_model),
        )
        .with_state(state)
}

/// Session-authenticated HTML surface.
fn ui_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/login", get(ui::login_form).post(ui::login))
        .route("/logout", get(ui::logout))
        .route("/:model", get(ui::model_list))
        .route("/:model/add", get(ui::model_add_form).post(ui::model_add))
        .route(
            "/:model/:id/edit",
            get(ui::model_edit_form).post(ui::model_edit),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType, ModelSpec};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn post_registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry
            .register(
                ModelSpec::new("Post")
                    .column(ColumnSpec::new("title", ColumnType::Text))
                    .column(ColumnSpec::new("content", ColumnType::Text)),
            )
            .unwrap();
        registry
    }

    // Lazy pool: never connects for requests that fail before a query.
    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/curator_test")
            .unwrap()
    }

    fn router(mode: AdminMode) -> Router {
        let (router, _) = Admin::new(post_registry(), b"test-secret")
            .mode(mode)
            .into_router(lazy_pool())
            .unwrap();
        router
    }

    #[tokio::test]
    async fn unauthenticated_api_create_is_forbidden() {
        let app = router(AdminMode::Both);
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/api/post")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title":"abc","content":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn garbage_token_is_forbidden() {
        let app = router(AdminMode::Both);
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/admin/api/post/1")
                    .header(header::AUTHORIZATION, "not-a-real-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn ui_redirects_anonymous_to_login() {
        let app = router(AdminMode::Both);
        let resp = app
            .oneshot(Request::builder().uri("/admin/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
    }

    #[tokio::test]
    async fn login_form_renders_without_a_session() {
        let app = router(AdminMode::Both);
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/admin/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("name=\"username\""));
        assert!(html.contains("type=\"password\""));
    }

    #[tokio::test]
    async fn api_mode_hides_the_ui() {
        let app = router(AdminMode::Api);
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/admin/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ui_mode_hides_the_api() {
        let app = router(AdminMode::Ui);
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/api/token")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=test&password=test"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn custom_prefix_moves_the_surface() {
        let (app, _) = Admin::new(post_registry(), b"test-secret")
            .prefix("/abcd")
            .into_router(lazy_pool())
            .unwrap();
        let resp = app
            .oneshot(Request::builder().uri("/abcd/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/abcd/login");
    }
}
