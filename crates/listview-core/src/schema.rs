//! Column schema: per-field type, filter mode and sortability.
//!
//! The schema is how callers declare which fields are free text (substring
//! filters) and which are enumerated (exact filters), and which kind a field has
//! so that sorting uses a natural ordering instead of ad hoc coercion.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{DATE_FORMAT, Record, Value};

/// Identity field used when a schema does not name one.
pub const DEFAULT_ID_FIELD: &str = "Id";

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Date,
    Bool,
}

/// How a filter predicate is matched against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Case-insensitive substring (free-text fields).
    #[default]
    Substring,
    /// Case-sensitive equality (enumerated fields such as a status picklist).
    Exact,
}

fn default_true() -> bool {
    true
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

/// One displayed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub filter: FilterMode,
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Must be non-blank for a record to be accepted by a sink.
    #[serde(default)]
    pub required: bool,
}

impl Column {
    pub fn new(field: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            field: field.into(),
            label: Some(label.into()),
            kind,
            filter: FilterMode::Substring,
            sortable: true,
            required: false,
        }
    }

    pub fn text(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, FieldKind::Text)
    }

    pub fn number(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, FieldKind::Number)
    }

    pub fn date(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, FieldKind::Date)
    }

    pub fn boolean(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, FieldKind::Bool)
    }

    /// Match filters on this column by exact equality.
    pub fn exact(mut self) -> Self {
        self.filter = FilterMode::Exact;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Header label, falling back to the field name.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

/// Error loading or validating a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    Io(String),
    Parse(String),
    DuplicateColumn(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io(msg) => write!(f, "I/O error: {}", msg),
            SchemaError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SchemaError::DuplicateColumn(field) => {
                write!(f, "Column '{}' is declared more than once", field)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Ordered set of columns plus the identity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self {
            id_field: default_id_field(),
            columns: Vec::new(),
        }
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Appends a column. A later column with the same field replaces the earlier one.
    pub fn column(mut self, column: Column) -> Self {
        match self.columns.iter_mut().find(|c| c.field == column.field) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_for(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// Undeclared fields filter by substring.
    pub fn filter_mode(&self, field: &str) -> FilterMode {
        self.column_for(field).map(|c| c.filter).unwrap_or_default()
    }

    /// Undeclared fields are sortable.
    pub fn is_sortable(&self, field: &str) -> bool {
        self.column_for(field).map(|c| c.sortable).unwrap_or(true)
    }

    pub fn kind_of(&self, field: &str) -> FieldKind {
        self.column_for(field).map(|c| c.kind).unwrap_or_default()
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.field.as_str())
            .collect()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.field == column.field) {
                return Err(SchemaError::DuplicateColumn(column.field.clone()));
            }
        }
        Ok(())
    }

    /// Derives one text/number/date/bool column per field seen in `records`,
    /// in field-name order with the identity field first. The kind comes from
    /// the first non-null value; strings shaped like `YYYY-MM-DD` become dates.
    pub fn infer(records: &[Record]) -> Self {
        let mut kinds: BTreeMap<&str, Option<FieldKind>> = BTreeMap::new();
        for record in records {
            for (field, value) in record.fields() {
                let slot = kinds.entry(field).or_insert(None);
                if slot.is_none() {
                    *slot = infer_kind(value);
                }
            }
        }

        let mut schema = Schema::new();
        let id = schema.id_field.clone();
        if let Some(kind) = kinds.remove(id.as_str()) {
            schema = schema.column(Column::new(id.clone(), id, kind.unwrap_or_default()));
        }
        for (field, kind) in kinds {
            schema = schema.column(Column::new(field, field, kind.unwrap_or_default()));
        }
        schema
    }
}

pub(crate) fn infer_kind(value: &Value) -> Option<FieldKind> {
    match value {
        Value::Null => None,
        Value::Number(_) => Some(FieldKind::Number),
        Value::Bool(_) => Some(FieldKind::Bool),
        Value::Date(_) => Some(FieldKind::Date),
        Value::Text(s) => {
            if NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok() {
                Some(FieldKind::Date)
            } else {
                Some(FieldKind::Text)
            }
        }
    }
}
