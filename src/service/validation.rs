//! Write validation against the model's declared column set.
//!
//! Every key is checked before any SQL executes, so a request with one valid
//! and one unknown field leaves the record untouched (all-or-nothing).

use crate::error::AppError;
use crate::model::spec::ModelSpec;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Reject any body key that is not a writable declared column.
/// Generated columns (id, created_at, updated_at) are not writable.
pub fn ensure_known_attributes(
    spec: &ModelSpec,
    body: &HashMap<String, Value>,
) -> Result<(), AppError> {
    let allowed: HashSet<&str> = spec.writable_columns().map(|c| c.name.as_str()).collect();
    for key in body.keys() {
        if !allowed.contains(key.as_str()) {
            return Err(AppError::UnknownAttribute {
                model: spec.name.clone(),
                attr: key.clone(),
            });
        }
    }
    Ok(())
}

/// For create: non-nullable columns without a database default must be
/// present and non-null.
pub fn ensure_required_for_create(
    spec: &ModelSpec,
    body: &HashMap<String, Value>,
) -> Result<(), AppError> {
    for col in spec.writable_columns() {
        if col.nullable || col.has_default {
            continue;
        }
        match body.get(&col.name) {
            None | Some(Value::Null) => {
                return Err(AppError::BadRequest(format!("{} is required", col.name)));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType};
    use serde_json::json;

    fn post_spec() -> ModelSpec {
        ModelSpec::new("post")
            .column(ColumnSpec::new("title", ColumnType::Text).not_null())
            .column(ColumnSpec::new("content", ColumnType::Text))
    }

    #[test]
    fn unknown_attribute_fails_whole_request() {
        let spec = post_spec();
        let mut body = HashMap::new();
        body.insert("title".to_string(), json!("ok"));
        body.insert("ghost_field".to_string(), json!("nope"));
        match ensure_known_attributes(&spec, &body) {
            Err(AppError::UnknownAttribute { model, attr }) => {
                assert_eq!(model, "post");
                assert_eq!(attr, "ghost_field");
            }
            other => panic!("expected UnknownAttribute, got {:?}", other),
        }
    }

    #[test]
    fn generated_columns_are_not_writable() {
        let spec = post_spec();
        let mut body = HashMap::new();
        body.insert("id".to_string(), json!(42));
        assert!(ensure_known_attributes(&spec, &body).is_err());
    }

    #[test]
    fn known_attributes_pass() {
        let spec = post_spec();
        let mut body = HashMap::new();
        body.insert("title".to_string(), json!("abc"));
        body.insert("content".to_string(), json!("x"));
        assert!(ensure_known_attributes(&spec, &body).is_ok());
    }

    #[test]
    fn create_requires_non_nullable_columns() {
        let spec = post_spec();
        let mut body = HashMap::new();
        body.insert("content".to_string(), json!("x"));
        assert!(ensure_required_for_create(&spec, &body).is_err());
        body.insert("title".to_string(), json!("abc"));
        assert!(ensure_required_for_create(&spec, &body).is_ok());
    }
}
