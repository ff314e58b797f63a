//! Record Entity
//!
//! A generic row exchanged with the backend: an immutable identifier plus a
//! field-name → value map.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned record identifier (Strapi `documentId`).
///
/// Never empty. Unsaved rows have no `RecordId` at all; they are addressed
/// through [`EditTarget::New`](super::EditTarget::New) instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == raw.len() {
            Some(Self(raw))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RecordId::new(value).ok_or_else(|| "record id must not be empty".to_string())
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Flag(bool),
    Number(i64),
    /// Foreign key into a related record list
    Reference(Option<RecordId>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&RecordId> {
        match self {
            FieldValue::Reference(id) => id.as_ref(),
            _ => None,
        }
    }

    /// Plain-text rendering for table cells and inputs
    pub fn display(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Reference(id) => id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

/// Field name → value
pub type Fields = BTreeMap<String, FieldValue>;

/// One entity instance (todo or employee)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self { id, fields: Fields::new() }
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn field(&self, name: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.fields.get(name).unwrap_or(&NULL)
    }
}
