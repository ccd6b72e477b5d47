//! Demo application: registers a Post model and mounts the admin surface.
//!
//! Run from repo root: `cargo run -p demo-app`
//! Then create a superuser: `cargo run --bin curator-admin -- create-superuser --username admin`

use curator_sdk::{
    common_routes_with_ready, ensure_admin_tables, Admin, AdminMode, ColumnSpec, ColumnType,
    ModelRegistry, ModelSpec,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("curator_sdk=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/curator_demo".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    ensure_admin_tables(&pool).await?;
    ensure_demo_tables(&pool).await?;

    let mut registry = ModelRegistry::new();
    registry.register(
        ModelSpec::new("Post")
            .column(ColumnSpec::new("title", ColumnType::Text).not_null())
            .column(ColumnSpec::new("content", ColumnType::Text)),
    )?;

    let secret = std::env::var("CURATOR_SECRET").unwrap_or_else(|_| "dev-secret".into());
    let (admin, state) = Admin::new(registry, secret.as_bytes())
        .mode(AdminMode::Both)
        .into_router(pool)?;

    let app = admin.merge(common_routes_with_ready(state));
    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("demo app listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ensure_demo_tables(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post (
            id BIGSERIAL PRIMARY KEY,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            title TEXT NOT NULL,
            content TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
