//! Model registry: registered specs keyed by lowercased name.
//!
//! The registry is an explicit object handed to handlers through `AppState`,
//! not process-wide state. Registration happens during single-threaded
//! startup; afterwards the registry is shared immutably behind an `Arc`.

use crate::error::RegistryError;
use crate::model::spec::ModelSpec;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    by_name: HashMap<String, ModelSpec>,
    /// Insertion order, for stable dashboard and schema listings.
    order: Vec<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model spec. Idempotent per lowercased name: re-registering
    /// an already-known name is a no-op. A spec with an empty name or no
    /// columns beyond nothing at all is a hard registration error.
    pub fn register(&mut self, spec: ModelSpec) -> Result<(), RegistryError> {
        if spec.name.trim().is_empty() {
            return Err(RegistryError::InvalidModel("name must not be empty".into()));
        }
        if spec.columns.is_empty() {
            return Err(RegistryError::InvalidModel(format!(
                "model '{}' declares no columns",
                spec.name
            )));
        }
        let key = spec.name.to_lowercase();
        if self.by_name.contains_key(&key) {
            tracing::debug!(model = %key, "model already registered, skipping");
            return Ok(());
        }
        self.order.push(key.clone());
        self.by_name.insert(key, spec);
        Ok(())
    }

    pub fn register_all<I: IntoIterator<Item = ModelSpec>>(
        &mut self,
        specs: I,
    ) -> Result<(), RegistryError> {
        for spec in specs {
            self.register(spec)?;
        }
        Ok(())
    }

    /// Case-insensitive lookup by registry name.
    pub fn get(&self, name: &str) -> Result<&ModelSpec, RegistryError> {
        self.by_name
            .get(&name.to_lowercase())
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_lowercase())
    }

    /// Whether any registered spec maps to the given SQL table name.
    /// Permission tags are scoped by table, so this is their validity check.
    pub fn has_table(&self, table: &str) -> bool {
        self.by_name.values().any(|s| s.table == table)
    }

    /// Registered specs in registration order.
    pub fn specs(&self) -> impl Iterator<Item = &ModelSpec> {
        self.order.iter().filter_map(|k| self.by_name.get(k))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType};

    fn post_spec() -> ModelSpec {
        ModelSpec::new("Post")
            .column(ColumnSpec::new("title", ColumnType::Text))
            .column(ColumnSpec::new("content", ColumnType::Text))
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = ModelRegistry::new();
        registry.register(post_spec()).unwrap();
        assert_eq!(registry.get("post").unwrap().name, "Post");
        assert_eq!(registry.get("POST").unwrap().name, "Post");
        assert_eq!(registry.get("Post").unwrap().name, "Post");
    }

    #[test]
    fn unknown_name_is_not_found() {
        let registry = ModelRegistry::new();
        match registry.get("ghost") {
            Err(RegistryError::ModelNotFound(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn register_is_idempotent_per_name() {
        let mut registry = ModelRegistry::new();
        registry.register(post_spec()).unwrap();
        registry.register(post_spec().table("post_v2")).unwrap();
        assert_eq!(registry.len(), 1);
        // first registration wins
        assert_eq!(registry.get("post").unwrap().table, "post");
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let mut registry = ModelRegistry::new();
        let empty_name = ModelSpec {
            name: "  ".into(),
            table: "x".into(),
            schema: None,
            columns: vec![ColumnSpec::new("id", ColumnType::BigInt)],
            relationships: Vec::new(),
        };
        assert!(matches!(
            registry.register(empty_name),
            Err(RegistryError::InvalidModel(_))
        ));
        let no_columns = ModelSpec {
            name: "bare".into(),
            table: "bare".into(),
            schema: None,
            columns: Vec::new(),
            relationships: Vec::new(),
        };
        assert!(matches!(
            registry.register(no_columns),
            Err(RegistryError::InvalidModel(_))
        ));
    }

    #[test]
    fn has_table_checks_table_names() {
        let mut registry = ModelRegistry::new();
        registry.register(post_spec().table("posts")).unwrap();
        assert!(registry.has_table("posts"));
        assert!(!registry.has_table("post"));
    }
}
