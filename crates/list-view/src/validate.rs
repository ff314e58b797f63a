//! Draft Validation
//!
//! Pure checks over a draft; the same draft always yields the same errors.

use std::collections::BTreeMap;

use crate::domain::{Draft, FieldKind, FieldValue, RecordId, RecordSchema, ValidationErrors};

/// Reference field name → ids loaded from the related list
pub type RelatedOptions = BTreeMap<String, Vec<RecordId>>;

/// Validate every schema field of `draft`.
///
/// Returns an empty map iff the draft may be sent to the data source.
pub fn validate_draft(schema: &RecordSchema, draft: &Draft, related: &RelatedOptions) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for spec in schema.fields {
        let value = draft.get(spec.name).unwrap_or(&FieldValue::Null);
        if let Some(message) = check_field(spec.label, spec.kind, value, related.get(spec.name)) {
            errors.insert(spec.name.to_string(), message);
        }
    }
    errors
}

fn check_field(label: &str, kind: FieldKind, value: &FieldValue, options: Option<&Vec<RecordId>>) -> Option<String> {
    match kind {
        FieldKind::RequiredText => match value.as_text() {
            Some(text) if !text.trim().is_empty() => None,
            _ => Some(format!("{} is required", label)),
        },
        FieldKind::Flag => None,
        FieldKind::PositiveNumber => match value.as_number() {
            Some(n) if n > 0 => None,
            _ => Some(format!("{} must be a positive number", label)),
        },
        FieldKind::Reference { related } => match value.as_reference() {
            None => Some(format!("{} is required", label)),
            Some(id) if options.is_some_and(|ids| ids.contains(id)) => None,
            Some(id) => Some(format!("{} `{}` does not match any loaded {}", label, id, related)),
        },
    }
}
