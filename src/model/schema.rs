//! Schema descriptors derived from model specs, for request validation docs.
//!
//! Models are registered at runtime, so the descriptor is plain data in
//! JSON-Schema shape rather than something derived from a compile-time type.
//! Foreign keys and relationships are included.

use crate::model::spec::{ModelSpec, RelationKind};
use serde_json::{json, Map, Value};

/// JSON-Schema-like descriptor for one model: `properties` typed per column,
/// `required` from non-nullable columns without defaults, relationships under
/// `relationships` with their direction and target.
pub fn schema_for(spec: &ModelSpec) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for col in &spec.columns {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(col.col_type.json_type()));
        if col.nullable {
            prop.insert("nullable".into(), json!(true));
        }
        if col.unique {
            prop.insert("unique".into(), json!(true));
        }
        if col.sensitive {
            prop.insert("writeOnly".into(), json!(true));
        }
        properties.insert(col.name.clone(), Value::Object(prop));
        if !col.nullable && !col.has_default {
            required.push(col.name.clone());
        }
    }

    let mut relationships = Map::new();
    for rel in &spec.relationships {
        relationships.insert(
            rel.name.clone(),
            json!({
                "kind": match rel.kind {
                    RelationKind::ToOne => "to_one",
                    RelationKind::ToMany => "to_many",
                },
                "target": rel.target,
                "foreign_key": match rel.kind {
                    RelationKind::ToOne => &rel.local_column,
                    RelationKind::ToMany => &rel.remote_column,
                },
            }),
        );
    }

    json!({
        "title": spec.name,
        "type": "object",
        "properties": properties,
        "required": required,
        "relationships": relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType, RelationSpec};

    #[test]
    fn schema_types_required_and_relationships() {
        let spec = ModelSpec::new("Post")
            .column(ColumnSpec::new("title", ColumnType::Text).not_null())
            .column(ColumnSpec::new("content", ColumnType::Text))
            .column(ColumnSpec::new("author_id", ColumnType::BigInt))
            .relationship(RelationSpec {
                name: "author".into(),
                kind: RelationKind::ToOne,
                target: "user".into(),
                local_column: "author_id".into(),
                remote_column: "id".into(),
                backref: Some("posts".into()),
            });
        let schema = schema_for(&spec);
        assert_eq!(schema["title"], "Post");
        assert_eq!(schema["properties"]["title"]["type"], "string");
        assert_eq!(schema["properties"]["author_id"]["type"], "integer");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(required.contains(&"title"));
        // generated columns have defaults, so they are not required
        assert!(!required.contains(&"id"));
        assert_eq!(schema["relationships"]["author"]["kind"], "to_one");
        assert_eq!(schema["relationships"]["author"]["foreign_key"], "author_id");
    }
}
