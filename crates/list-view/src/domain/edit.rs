//! Edit Session
//!
//! Transient client-side state for an inline edit or add row that has not
//! been committed yet. At most one exists per list view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::{FieldValue, Fields, RecordId};

/// Field name → error message. Empty iff the draft is valid.
pub type ValidationErrors = BTreeMap<String, String>;

/// Which row an edit session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Existing(RecordId),
    /// The unsaved add-row; never collides with a server id
    New,
}

/// Uncommitted field values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Draft {
    pub fields: Fields,
}

impl Draft {
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    #[default]
    None,
    Editing {
        id: RecordId,
        draft: Draft,
        errors: ValidationErrors,
    },
    Adding {
        draft: Draft,
        errors: ValidationErrors,
    },
}

impl EditSession {
    pub fn editing(id: RecordId, draft: Draft) -> Self {
        EditSession::Editing { id, draft, errors: ValidationErrors::new() }
    }

    pub fn adding(draft: Draft) -> Self {
        EditSession::Adding { draft, errors: ValidationErrors::new() }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, EditSession::None)
    }

    pub fn target(&self) -> Option<EditTarget> {
        match self {
            EditSession::None => None,
            EditSession::Editing { id, .. } => Some(EditTarget::Existing(id.clone())),
            EditSession::Adding { .. } => Some(EditTarget::New),
        }
    }

    /// True if `id` is the row being edited
    pub fn is_editing(&self, id: &RecordId) -> bool {
        matches!(self, EditSession::Editing { id: current, .. } if current == id)
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            EditSession::None => None,
            EditSession::Editing { draft, .. } | EditSession::Adding { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            EditSession::None => None,
            EditSession::Editing { draft, .. } | EditSession::Adding { draft, .. } => Some(draft),
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            EditSession::None => None,
            EditSession::Editing { errors, .. } | EditSession::Adding { errors, .. } => Some(errors),
        }
    }

    pub fn errors_mut(&mut self) -> Option<&mut ValidationErrors> {
        match self {
            EditSession::None => None,
            EditSession::Editing { errors, .. } | EditSession::Adding { errors, .. } => Some(errors),
        }
    }

    /// Close the session, returning what was open
    pub fn close(&mut self) -> EditSession {
        std::mem::take(self)
    }
}
