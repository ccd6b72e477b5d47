//! Principals: the user rows behind authentication, and their store.
//!
//! `Principal` is a flat capability object (verify password, admin flag,
//! permission tags) resolved from the database by `PrincipalStore`; there is
//! no inheritance between the auth model and other registered models.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::permission::Permission;
use crate::error::AppError;
use crate::model::registry::ModelRegistry;
use crate::model::spec::{ColumnSpec, ColumnType, ModelSpec};
use crate::store::{curator_schema, users_table};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::HashMap;

/// Spec for the built-in user model. Registered by the admin façade so the
/// generic CRUD surface and permission tags cover users like any other model.
pub fn user_spec() -> ModelSpec {
    ModelSpec::new("user")
        .table("users")
        .schema(&curator_schema())
        .column(ColumnSpec::new("username", ColumnType::Text).not_null().unique())
        .column(ColumnSpec::new("name", ColumnType::Text))
        .column(ColumnSpec::new("email", ColumnType::Text).unique())
        .column(ColumnSpec::new("password_hash", ColumnType::Text).sensitive())
        .column(ColumnSpec::new("permissions", ColumnType::Json).with_default())
        .column(ColumnSpec::new("is_admin", ColumnType::Boolean).not_null().with_default())
}

#[derive(Clone, Debug)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub permissions: Vec<String>,
    pub is_admin: bool,
}

impl Principal {
    pub fn verify_password(&self, plain: &str) -> bool {
        match &self.password_hash {
            Some(hash) => verify_password(plain, hash),
            None => false,
        }
    }

    pub fn has_permission(&self, perm: &Permission) -> bool {
        self.permissions.iter().any(|p| p == perm.as_str())
    }

    /// Append a permission tag. Holding the tag already is a warning, not an
    /// error; the tag is appended regardless, so the stored list may contain
    /// duplicates.
    pub fn add_permission_tag(&mut self, perm: &Permission) {
        if self.has_permission(perm) {
            tracing::warn!(user = %self.username, permission = %perm, "user already holds permission");
        }
        self.permissions.push(perm.as_str().to_string());
    }
}

type PrincipalRow = (
    i64,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Value,
    bool,
);

fn principal_from_row(row: PrincipalRow) -> Principal {
    let (id, username, name, email, password_hash, permissions, is_admin) = row;
    let permissions = serde_json::from_value(permissions).unwrap_or_default();
    Principal {
        id,
        username,
        name,
        email,
        password_hash,
        permissions,
        is_admin,
    }
}

const PRINCIPAL_COLUMNS: &str = "id, username, name, email, password_hash, permissions, is_admin";

pub struct PrincipalStore;

impl PrincipalStore {
    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Option<Principal>, AppError> {
        let row: Option<PrincipalRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            PRINCIPAL_COLUMNS,
            users_table()
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(principal_from_row))
    }

    pub async fn by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Principal>, AppError> {
        let row: Option<PrincipalRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE username = $1",
            PRINCIPAL_COLUMNS,
            users_table()
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(principal_from_row))
    }

    /// Create a user with a hashed password, seeded with a read permission
    /// for every registered model.
    pub async fn create(
        pool: &PgPool,
        registry: &ModelRegistry,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<Principal, AppError> {
        let password_hash = hash_password(password)?;
        let permissions: Vec<String> = registry
            .specs()
            .filter_map(|spec| {
                Permission::new(&spec.table, "read", registry)
                    .ok()
                    .map(|p| p.as_str().to_string())
            })
            .collect();
        let row: PrincipalRow = sqlx::query_as(&format!(
            "INSERT INTO {} (username, password_hash, permissions, is_admin) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            users_table(),
            PRINCIPAL_COLUMNS
        ))
        .bind(username)
        .bind(&password_hash)
        .bind(json!(permissions))
        .bind(is_admin)
        .fetch_one(pool)
        .await?;
        Ok(principal_from_row(row))
    }

    /// Persist the in-memory permission list.
    pub async fn save_permissions(pool: &PgPool, principal: &Principal) -> Result<(), AppError> {
        sqlx::query(&format!(
            "UPDATE {} SET permissions = $1, updated_at = NOW() WHERE id = $2",
            users_table()
        ))
        .bind(json!(principal.permissions))
        .bind(principal.id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Append a permission tag and persist (warn-and-allow on duplicates).
    pub async fn add_permission(
        pool: &PgPool,
        principal: &mut Principal,
        perm: &Permission,
    ) -> Result<(), AppError> {
        principal.add_permission_tag(perm);
        Self::save_permissions(pool, principal).await
    }
}

/// Transform a user-model write body: the virtual `password` attribute is
/// hashed into `password_hash`; a client-supplied `password_hash` is rejected
/// outright; everything else passes through for the generic allow-list check.
pub fn prepare_user_write(
    body: HashMap<String, Value>,
) -> Result<HashMap<String, Value>, AppError> {
    let mut out = HashMap::with_capacity(body.len());
    for (key, value) in body {
        match key.as_str() {
            "password_hash" => {
                return Err(AppError::BadRequest(
                    "you should not hard-code the password hash".into(),
                ));
            }
            "password" => {
                let plain = value
                    .as_str()
                    .ok_or_else(|| AppError::BadRequest("password must be a string".into()))?;
                out.insert("password_hash".to_string(), json!(hash_password(plain)?));
            }
            _ => {
                out.insert(key, value);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType};

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry.register(user_spec()).unwrap();
        registry
            .register(
                ModelSpec::new("Post")
                    .column(ColumnSpec::new("title", ColumnType::Text))
                    .column(ColumnSpec::new("content", ColumnType::Text)),
            )
            .unwrap();
        registry
    }

    fn principal() -> Principal {
        Principal {
            id: 1,
            username: "test".into(),
            name: None,
            email: None,
            password_hash: None,
            permissions: Vec::new(),
            is_admin: true,
        }
    }

    #[test]
    fn duplicate_permission_is_appended_anyway() {
        let registry = registry();
        let perm = Permission::new("post", "read", &registry).unwrap();
        let mut p = principal();
        p.add_permission_tag(&perm);
        assert!(p.has_permission(&perm));
        // second add warns but still appends
        p.add_permission_tag(&perm);
        assert_eq!(
            p.permissions.iter().filter(|t| *t == "post_read").count(),
            2
        );
    }

    #[test]
    fn password_is_hashed_and_hash_writes_rejected() {
        let body: HashMap<String, Value> =
            [("password".to_string(), json!("hunter2"))].into_iter().collect();
        let out = prepare_user_write(body).unwrap();
        let hash = out["password_hash"].as_str().unwrap();
        assert!(crate::auth::password::verify_password("hunter2", hash));

        let body: HashMap<String, Value> =
            [("password_hash".to_string(), json!("sneaky"))].into_iter().collect();
        assert!(prepare_user_write(body).is_err());
    }

    #[test]
    fn missing_password_hash_never_verifies() {
        assert!(!principal().verify_password("anything"));
    }
}
