//! Permission tags: `{table}_{action}` capability strings scoped to a
//! registered persistent type. Construction fails for unknown tables.

use crate::error::RegistryError;
use crate::model::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Build a `{table}_{action}` tag. The table must map to a registered
    /// model, otherwise the offending name is reported as not found.
    pub fn new(
        table: &str,
        action: &str,
        registry: &ModelRegistry,
    ) -> Result<Self, RegistryError> {
        if !registry.has_table(table) {
            return Err(RegistryError::ModelNotFound(table.to_string()));
        }
        Ok(Permission(format!("{}_{}", table, action)))
    }

    /// Wrap an already-stored tag without re-validating the table.
    pub fn from_stored(tag: &str) -> Self {
        Permission(tag.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::{ColumnSpec, ColumnType, ModelSpec};

    fn registry_with_post() -> ModelRegistry {
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

    #[test]
    fn registered_table_builds_a_tag() {
        let registry = registry_with_post();
        let perm = Permission::new("post", "read", &registry).unwrap();
        assert_eq!(perm.as_str(), "post_read");
    }

    #[test]
    fn unknown_table_carries_the_offending_name() {
        let registry = registry_with_post();
        match Permission::new("ghost", "read", &registry) {
            Err(RegistryError::ModelNotFound(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }
}
