//! Row serialization: database rows to JSON objects shaped by the model spec.
//!
//! Sensitive columns (password hashes) are stripped unconditionally, on top
//! of any caller-provided exclusion set. Relationship values are attached by
//! the service layer one level deep: to-many becomes an array (possibly
//! empty), to-one becomes an object or null.

use crate::model::spec::ModelSpec;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use std::collections::HashSet;

/// Convert one row to a JSON object, spec columns only, sensitive columns
/// and any `exclude`d names omitted.
pub fn row_to_object(spec: &ModelSpec, row: &PgRow, exclude: &HashSet<&str>) -> Value {
    let mut map = Map::new();
    for col in &spec.columns {
        if col.sensitive || exclude.contains(col.name.as_str()) {
            continue;
        }
        map.insert(col.name.clone(), cell_to_value(row, &col.name));
    }
    Value::Object(map)
}

/// Strip sensitive and excluded keys from an already-built object.
/// Used when a value was produced outside `row_to_object` (form echo, tests).
pub fn strip_excluded(spec: &ModelSpec, value: &mut Value, exclude: &HashSet<&str>) {
    if let Value::Object(map) = value {
        for col in &spec.columns {
            if col.sensitive || exclude.contains(col.name.as_str()) {
                map.remove(&col.name);
            }
        }
    }
}

/// Attach a serialized relationship value under its name.
/// `None` for a to-one relation becomes JSON null.
pub fn attach_relation(value: &mut Value, name: &str, related: Value) {
    if let Value::Object(map) = value {
        map.insert(name.to_string(), related);
    }
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType};
    use serde_json::json;

    fn user_spec() -> ModelSpec {
        ModelSpec::new("user")
            .column(ColumnSpec::new("username", ColumnType::Text))
            .column(ColumnSpec::new("password_hash", ColumnType::Text).sensitive())
    }

    #[test]
    fn sensitive_columns_are_always_stripped() {
        let spec = user_spec();
        let mut value = json!({
            "id": 1,
            "username": "test",
            "password_hash": "$2b$12$abcdef",
        });
        strip_excluded(&spec, &mut value, &HashSet::new());
        assert_eq!(value["username"], "test");
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn caller_excludes_compose_with_sensitive() {
        let spec = user_spec();
        let mut value = json!({"id": 1, "username": "test", "password_hash": "h"});
        let exclude: HashSet<&str> = ["username"].into_iter().collect();
        strip_excluded(&spec, &mut value, &exclude);
        assert!(value.get("username").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn relations_attach_under_their_name() {
        let mut value = json!({"id": 1});
        attach_relation(&mut value, "comments", json!([{"id": 9}]));
        attach_relation(&mut value, "author", Value::Null);
        assert_eq!(value["comments"][0]["id"], 9);
        assert!(value["author"].is_null());
    }
}
