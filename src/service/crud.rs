//! Generic CRUD execution against PostgreSQL.

use crate::error::AppError;
use crate::model::registry::ModelRegistry;
use crate::model::spec::{ModelSpec, RelationKind};
use crate::serialize::{attach_relation, row_to_object};
use crate::sql::{self, BindValue, QueryBuf};
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

pub struct CrudService;

impl CrudService {
    /// Fetch one row by primary key. Returns the serialized object or None.
    pub async fn read(
        pool: &PgPool,
        spec: &ModelSpec,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let mut q = sql::select_by_id(spec);
        q.params.push(json!(id));
        let row = Self::fetch_optional(pool, &q).await?;
        Ok(row.map(|r| row_to_object(spec, &r, &HashSet::new())))
    }

    /// Fetch one row and attach its relationships one level deep:
    /// to-many as an array (empty when nothing matches), to-one as an object
    /// or null. The backref name is excluded on the related side.
    pub async fn read_with_relations(
        pool: &PgPool,
        registry: &ModelRegistry,
        spec: &ModelSpec,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let Some(mut value) = Self::read(pool, spec, id).await? else {
            return Ok(None);
        };
        for rel in &spec.relationships {
            let related_spec = registry.get(&rel.target)?;
            let exclude: HashSet<&str> = rel
                .backref
                .as_deref()
                .map(|b| [b].into_iter().collect())
                .unwrap_or_default();
            match rel.kind {
                RelationKind::ToMany => {
                    let q = sql::select_by_column(related_spec, &rel.remote_column, json!(id));
                    let rows = Self::fetch_all(pool, &q).await?;
                    let items: Vec<Value> = rows
                        .iter()
                        .map(|r| row_to_object(related_spec, r, &exclude))
                        .collect();
                    attach_relation(&mut value, &rel.name, Value::Array(items));
                }
                RelationKind::ToOne => {
                    let fk = value.get(&rel.local_column).cloned().unwrap_or(Value::Null);
                    let related = if fk.is_null() {
                        Value::Null
                    } else {
                        let q = sql::select_by_column(related_spec, &rel.remote_column, fk);
                        Self::fetch_optional(pool, &q)
                            .await?
                            .map(|r| row_to_object(related_spec, &r, &exclude))
                            .unwrap_or(Value::Null)
                    };
                    attach_relation(&mut value, &rel.name, related);
                }
            }
        }
        Ok(Some(value))
    }

    /// List a page of rows ordered by id. Limit defaults to 100, capped at 1000.
    pub async fn list(
        pool: &PgPool,
        spec: &ModelSpec,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        const DEFAULT_LIMIT: u32 = 100;
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(1000);
        let q = sql::select_list(spec, limit, offset.unwrap_or(0));
        let rows = Self::fetch_all(pool, &q).await?;
        Ok(rows
            .iter()
            .map(|r| row_to_object(spec, r, &HashSet::new()))
            .collect())
    }

    /// Insert one row from a validated body. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        spec: &ModelSpec,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(spec, body);
        let row = Self::fetch_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        Ok(row_to_object(spec, &row, &HashSet::new()))
    }

    /// Update one row by id from a validated body. Returns the updated row or None.
    pub async fn update(
        pool: &PgPool,
        spec: &ModelSpec,
        id: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        if body.is_empty() {
            return Self::read(pool, spec, id).await;
        }
        let q = sql::update(spec, json!(id), body);
        let row = Self::fetch_optional(pool, &q).await?;
        Ok(row.map(|r| row_to_object(spec, &r, &HashSet::new())))
    }

    /// Delete one row by id. Returns whether a row was deleted.
    pub async fn delete(pool: &PgPool, spec: &ModelSpec, id: i64) -> Result<bool, AppError> {
        let q = sql::delete(spec, json!(id));
        let row = Self::fetch_optional(pool, &q).await?;
        Ok(row.is_some())
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<PgRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(BindValue::from_json(p));
        }
        Ok(query.fetch_optional(pool).await?)
    }

    async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<PgRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(BindValue::from_json(p));
        }
        Ok(query.fetch_all(pool).await?)
    }
}
