//! Record Schema
//!
//! Static description of one record type: which attributes may be used as
//! a search filter and how each editable field is validated.

use super::record::{FieldValue, Fields, RecordId};

/// How a field is edited and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text that must be non-empty after trimming
    RequiredText,
    /// Checkbox
    Flag,
    /// Integer that must be > 0
    PositiveNumber,
    /// Identifier that must match one of the loaded `related` options
    Reference { related: &'static str },
}

impl FieldKind {
    /// Value a fresh add-row starts with
    pub fn initial_value(&self) -> FieldValue {
        match self {
            FieldKind::RequiredText => FieldValue::Text(String::new()),
            FieldKind::Flag => FieldValue::Flag(false),
            FieldKind::PositiveNumber => FieldValue::Null,
            FieldKind::Reference { .. } => FieldValue::Reference(None),
        }
    }

    /// Convert raw form input into a typed value.
    ///
    /// Unparseable numbers become `Null` so validation reports them.
    pub fn parse_input(&self, raw: &str) -> FieldValue {
        match self {
            FieldKind::RequiredText => FieldValue::Text(raw.to_string()),
            FieldKind::Flag => FieldValue::Flag(matches!(raw.trim(), "true" | "on" | "1")),
            FieldKind::PositiveNumber => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Null),
            FieldKind::Reference { .. } => FieldValue::Reference(RecordId::new(raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// A searchable attribute offered in the "Filter By" select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterAttribute {
    pub name: &'static str,
    pub label: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RecordSchema {
    /// Record type name used in logs and messages ("todo", "employee")
    pub kind: &'static str,
    pub filter_attributes: &'static [FilterAttribute],
    /// Must be one of `filter_attributes`
    pub default_filter: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordSchema {
    pub fn is_filter_attribute(&self, name: &str) -> bool {
        self.filter_attributes.iter().any(|a| a.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Draft fields for a new row
    pub fn initial_fields(&self) -> Fields {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.kind.initial_value()))
            .collect()
    }

    /// Editable subset of a record's fields, filling gaps with initial values
    pub fn editable_fields(&self, fields: &Fields) -> Fields {
        self.fields
            .iter()
            .map(|f| {
                let value = fields.get(f.name).cloned().unwrap_or_else(|| f.kind.initial_value());
                (f.name.to_string(), value)
            })
            .collect()
    }
}
