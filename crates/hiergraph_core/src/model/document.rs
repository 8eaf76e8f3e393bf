//! Document entries and normalized document records.
//!
//! # Responsibility
//! - Define the host-facing document entry and raw metadata value shapes.
//! - Define the uniform record every builder consumes.
//!
//! # Invariants
//! - `DocumentRecord` is immutable once produced by normalization.
//! - `path` is the unique identity of a document.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw per-document metadata value as supplied by either backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Structured link carrying the linked document path.
    Link { path: String },
    List(Vec<RawValue>),
}

/// Metadata map keyed by field name.
pub type FieldMap = BTreeMap<String, RawValue>;

impl RawValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn link(path: impl Into<String>) -> Self {
        Self::Link { path: path.into() }
    }

    /// Truthiness used for flag-like keys.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::Text(value) => !value.trim().is_empty() && value.trim() != "false",
            Self::Link { path } => !path.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Text content, if this value is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Numeric content of numbers and numeric strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Text(value) => value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for RawValue {
    /// Objects with a string `path` become links; other objects carry no data.
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => value.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(value) => Self::Text(value),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(mut map) => match map.remove("path") {
                Some(Value::String(path)) => Self::Link { path },
                _ => Self::Null,
            },
        }
    }
}

/// Converts a JSON object into a metadata map; non-objects yield an empty map.
pub fn field_map_from_json(value: serde_json::Value) -> FieldMap {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| (key, RawValue::from(value)))
            .collect(),
        _ => FieldMap::new(),
    }
}

/// One document as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub path: String,
    pub folder: String,
    pub basename: String,
    pub extension: String,
}

impl DocumentEntry {
    /// Derives folder, basename and extension from a workspace path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            folder: paths::folder_of(&path).to_string(),
            basename: paths::basename_of(&path).to_string(),
            extension: paths::extension_of(&path).to_string(),
            path,
        }
    }
}

/// Uniform record produced by metadata normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub path: String,
    pub folder: String,
    pub basename: String,
    pub extension: String,
    pub fields: FieldMap,
}

impl DocumentRecord {
    pub fn new(entry: DocumentEntry, fields: FieldMap) -> Self {
        Self {
            path: entry.path,
            folder: entry.folder,
            basename: entry.basename,
            extension: entry.extension,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }

    /// Numeric order read from `order_field`, if present and numeric.
    pub fn order(&self, order_field: &str) -> Option<f64> {
        self.field(order_field).and_then(RawValue::as_number)
    }
}
