pub mod registry;
pub mod schema;
pub mod spec;

pub use registry::ModelRegistry;
pub use schema::schema_for;
pub use spec::{ColumnSpec, ColumnType, ModelSpec, RelationKind, RelationSpec, GENERATED_COLUMNS};
