//! Runtime model descriptors: the column and relationship shape of a registered type.

use serde::{Deserialize, Serialize};

/// Scalar column type. Drives value coercion and schema output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInt,
    Text,
    Boolean,
    Float,
    Timestamp,
    Uuid,
    Json,
}

impl ColumnType {
    /// JSON Schema type name for this column type.
    pub fn json_type(self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::BigInt => "integer",
            ColumnType::Text | ColumnType::Timestamp | ColumnType::Uuid => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "number",
            ColumnType::Json => "object",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub col_type: ColumnType,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    /// Whether the column has a database-side default (generated ids, timestamps).
    #[serde(default)]
    pub has_default: bool,
    /// Never exposed in serialized output (password hashes, secrets).
    #[serde(default)]
    pub sensitive: bool,
}

fn default_true() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(name: &str, col_type: ColumnType) -> Self {
        ColumnSpec {
            name: name.to_string(),
            col_type,
            nullable: true,
            unique: false,
            has_default: false,
            sensitive: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Direction of a relationship: to_one (we hold the FK) or to_many (they hold the FK to us).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ToOne,
    ToMany,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationSpec {
    /// Key under which related rows appear in serialized output.
    pub name: String,
    pub kind: RelationKind,
    /// Registry name of the related model.
    pub target: String,
    /// Our column used in the join (our FK for to_one; our PK for to_many).
    pub local_column: String,
    /// Their column used in the join (their PK for to_one; their FK for to_many).
    pub remote_column: String,
    /// Reverse relationship name on the target, excluded when serializing the
    /// related side so recursion stops after one level.
    #[serde(default)]
    pub backref: Option<String>,
}

/// Full descriptor of one registered persistent type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Registry key and API path segment. Lookup is case-insensitive.
    pub name: String,
    /// SQL table name (usually equal to `name`).
    pub table: String,
    /// Optional schema qualifier for the table.
    #[serde(default)]
    pub schema: Option<String>,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub relationships: Vec<RelationSpec>,
}

/// Columns every model carries implicitly: generated id plus audit timestamps.
pub const GENERATED_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

impl ModelSpec {
    /// Descriptor with the implicit base columns (id, created_at, updated_at)
    /// pre-filled. The table name defaults to the lowercased model name.
    pub fn new(name: &str) -> Self {
        ModelSpec {
            name: name.to_string(),
            table: name.to_lowercase(),
            schema: None,
            columns: vec![
                ColumnSpec::new("id", ColumnType::BigInt).not_null().with_default(),
                ColumnSpec::new("created_at", ColumnType::Timestamp).not_null().with_default(),
                ColumnSpec::new("updated_at", ColumnType::Timestamp).not_null().with_default(),
            ],
            relationships: Vec::new(),
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn column(mut self, col: ColumnSpec) -> Self {
        self.columns.push(col);
        self
    }

    pub fn relationship(mut self, rel: RelationSpec) -> Self {
        self.relationships.push(rel);
        self
    }

    pub fn column_named(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_named(name).is_some()
    }

    /// Column names a client may set: declared columns minus the generated ones.
    pub fn writable_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| !GENERATED_COLUMNS.contains(&c.name.as_str()))
    }
}
