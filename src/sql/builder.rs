//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from model specs.
//!
//! Identifiers only ever come from registered specs; request values are
//! always bound as parameters, never interpolated.

use crate::model::spec::{ColumnType, ModelSpec};
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified table name.
fn table_ref(spec: &ModelSpec) -> String {
    match &spec.schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&spec.table)),
        None => quoted(&spec.table),
    }
}

/// Cast suffix so text-encoded parameters land in typed columns.
fn cast_for(col_type: ColumnType) -> &'static str {
    match col_type {
        ColumnType::Integer => "::int4",
        ColumnType::BigInt => "::int8",
        ColumnType::Text => "::text",
        ColumnType::Boolean => "::boolean",
        ColumnType::Float => "::float8",
        ColumnType::Timestamp => "::timestamptz",
        ColumnType::Uuid => "::uuid",
        ColumnType::Json => "::jsonb",
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn select_column_list(spec: &ModelSpec) -> String {
    spec.columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key. Caller binds the id as sole param.
pub fn select_by_id(spec: &ModelSpec) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(spec),
        table_ref(spec),
        quoted("id")
    );
    q
}

/// SELECT rows where `column` equals the bound value. Used to load related rows.
pub fn select_by_column(spec: &ModelSpec, column: &str, value: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        select_column_list(spec),
        table_ref(spec),
        quoted(column),
        n
    );
    q
}

/// SELECT a page of rows ordered by id.
pub fn select_list(spec: &ModelSpec, limit: u32, offset: u32) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(spec),
        table_ref(spec),
        quoted("id"),
        limit,
        offset
    );
    q
}

/// INSERT from a validated body map, RETURNING the full row.
/// Only keys present in the body are inserted; generated columns rely on
/// their database defaults.
pub fn insert(spec: &ModelSpec, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut names = Vec::new();
    let mut placeholders = Vec::new();
    // iterate spec columns for a deterministic order
    for col in &spec.columns {
        if let Some(v) = body.get(&col.name) {
            names.push(quoted(&col.name));
            let n = q.push_param(v.clone());
            placeholders.push(format!("${}{}", n, cast_for(col.col_type)));
        }
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table_ref(spec),
        names.join(", "),
        placeholders.join(", "),
        select_column_list(spec)
    );
    q
}

/// UPDATE by id from a validated body map, RETURNING the full row.
/// Touches updated_at when the spec declares it.
pub fn update(spec: &ModelSpec, id: Value, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for col in &spec.columns {
        if let Some(v) = body.get(&col.name) {
            let n = q.push_param(v.clone());
            sets.push(format!(
                "{} = ${}{}",
                quoted(&col.name),
                n,
                cast_for(col.col_type)
            ));
        }
    }
    if spec.has_column("updated_at") && !body.contains_key("updated_at") {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    let id_n = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table_ref(spec),
        sets.join(", "),
        quoted("id"),
        id_n,
        select_column_list(spec)
    );
    q
}

/// DELETE by primary key, RETURNING the id so the caller can tell a miss from a hit.
pub fn delete(spec: &ModelSpec, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        table_ref(spec),
        quoted("id"),
        n,
        quoted("id")
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ModelSpec};
    use serde_json::json;

    fn post_spec() -> ModelSpec {
        ModelSpec::new("post")
            .column(ColumnSpec::new("title", ColumnType::Text))
            .column(ColumnSpec::new("content", ColumnType::Text))
    }

    #[test]
    fn select_by_id_targets_pk() {
        let q = select_by_id(&post_spec());
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"created_at\", \"updated_at\", \"title\", \"content\" FROM \"post\" WHERE \"id\" = $1"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_binds_only_present_columns_in_spec_order() {
        let spec = post_spec();
        let mut body = HashMap::new();
        body.insert("content".to_string(), json!("x"));
        body.insert("title".to_string(), json!("abc"));
        let q = insert(&spec, &body);
        assert_eq!(
            q.sql,
            "INSERT INTO \"post\" (\"title\", \"content\") VALUES ($1::text, $2::text) \
             RETURNING \"id\", \"created_at\", \"updated_at\", \"title\", \"content\""
        );
        assert_eq!(q.params, vec![json!("abc"), json!("x")]);
    }

    #[test]
    fn update_sets_body_keys_and_touches_updated_at() {
        let spec = post_spec();
        let mut body = HashMap::new();
        body.insert("title".to_string(), json!("new"));
        let q = update(&spec, json!(3), &body);
        assert!(q.sql.starts_with("UPDATE \"post\" SET \"title\" = $1::text, \"updated_at\" = NOW() WHERE \"id\" = $2"));
        assert_eq!(q.params, vec![json!("new"), json!(3)]);
    }

    #[test]
    fn schema_qualified_tables_are_quoted() {
        let spec = post_spec().schema("app");
        let q = delete(&spec, json!(1));
        assert!(q.sql.starts_with("DELETE FROM \"app\".\"post\""));
    }
}
