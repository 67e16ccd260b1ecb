//! Record and value model.
//!
//! A [`Record`] is a flat mapping from field name to [`Value`]. Nothing nested is
//! interpreted: arrays and objects coming from JSON are kept as their JSON text.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::fmt::{format_date, format_number};
use crate::schema::{FieldKind, Schema};

/// Date layout used for decoding and display.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static NULL: Value = Value::Null;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or whitespace-only text. Used for required-field checks.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text shown in tables, matched by filters and written to exports.
    /// Null renders as the empty string.
    pub fn display_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            Value::Date(d) => format_date(*d),
        }
    }

    /// Ordering used by sorts on a column declared as `kind`.
    ///
    /// Blank values (Null or empty text) come first and compare equal. Values
    /// of the declared kind follow in their natural order, then anything that
    /// did not fit the kind, by display text. Text columns therefore order
    /// every non-blank value by display text.
    pub fn sort_cmp(&self, other: &Value, kind: FieldKind) -> Ordering {
        self.sort_rank(kind)
            .cmp(&other.sort_rank(kind))
            .then_with(|| match (self, other) {
                (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                (Value::Date(a), Value::Date(b)) => a.cmp(b),
                (a, b) => a.display_text().cmp(&b.display_text()),
            })
    }

    fn sort_rank(&self, kind: FieldKind) -> u8 {
        match (self, kind) {
            (Value::Null, _) => 0,
            (Value::Text(s), _) if s.is_empty() => 0,
            (Value::Number(_), FieldKind::Number)
            | (Value::Bool(_), FieldKind::Bool)
            | (Value::Date(_), FieldKind::Date) => 1,
            _ => 2,
        }
    }

    /// Decodes a JSON value. With a declared kind the result is coerced to it;
    /// anything that does not parse stays text.
    pub fn from_json(value: &serde_json::Value, kind: Option<FieldKind>) -> Self {
        let decoded = match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .unwrap_or_else(|| Value::Text(n.to_string())),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        };
        match kind {
            Some(kind) => decoded.coerce(kind),
            None => decoded,
        }
    }

    /// Converts the value to `kind` through its text form. A text column holds
    /// only text; other kinds keep values that do not parse as text.
    pub fn coerce(self, kind: FieldKind) -> Self {
        match (kind, self) {
            (_, Value::Null) => Value::Null,
            (kind, Value::Text(s)) => Value::from_input(kind, &s),
            (FieldKind::Text, v) => Value::Text(v.display_text()),
            (FieldKind::Number, v @ Value::Number(_))
            | (FieldKind::Bool, v @ Value::Bool(_))
            | (FieldKind::Date, v @ Value::Date(_)) => v,
            (kind, v) => Value::from_input(kind, &v.display_text()),
        }
    }

    /// Converts user-entered text into a value of the given kind.
    /// Empty input is Null.
    pub fn from_input(kind: FieldKind, input: &str) -> Self {
        if input.is_empty() {
            return Value::Null;
        }
        let trimmed = input.trim();
        match kind {
            FieldKind::Text => Value::Text(input.to_string()),
            FieldKind::Number => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .unwrap_or_else(|| Value::Text(input.to_string())),
            FieldKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(Value::Date)
                .unwrap_or_else(|_| Value::Text(input.to_string())),
            FieldKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Value::Bool(true),
                "false" | "no" | "0" => Value::Bool(false),
                _ => Value::Text(input.to_string()),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Date(d) => serde_json::Value::String(format_date(*d)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// One item of a displayed list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Missing fields read as [`Value::Null`].
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Identity of the record, read from `id_field`.
    pub fn id(&self, id_field: &str) -> Option<String> {
        match self.get(id_field) {
            Value::Null => None,
            v => Some(v.display_text()),
        }
    }

    /// Decodes a flat JSON object using the schema's declared field kinds.
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
        schema: &Schema,
    ) -> Self {
        let fields = object
            .iter()
            .map(|(name, value)| {
                let kind = schema.column_for(name).map(|c| c.kind);
                (name.clone(), Value::from_json(value, kind))
            })
            .collect();
        Self { fields }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let object: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(object)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}
