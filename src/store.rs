//! Admin table DDL. The users table lives in a schema named from
//! `CURATOR_SCHEMA` env (default `curator`); registered application models
//! are assumed to be migrated by the host application.

use crate::error::AppError;
use sqlx::PgPool;

/// Schema name for admin tables. Must be a valid PostgreSQL identifier.
pub fn curator_schema() -> String {
    std::env::var("CURATOR_SCHEMA").unwrap_or_else(|_| "curator".into())
}

/// Schema-qualified users table name (e.g. "curator.users").
pub fn users_table() -> String {
    format!("{}.users", curator_schema())
}

/// Create the admin schema and users table if absent.
pub async fn ensure_admin_tables(pool: &PgPool) -> Result<(), AppError> {
    let schema = curator_schema();
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;

    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            username TEXT NOT NULL UNIQUE,
            name TEXT,
            email TEXT UNIQUE,
            password_hash TEXT,
            permissions JSONB NOT NULL DEFAULT '[]',
            is_admin BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
        users_table()
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}
