//! Frontend Models
//!
//! Record schemas for the two tables and the wire shapes returned by the
//! Strapi backend, converted into generic `Record`s for the list view.

use list_view::{
    Draft, FieldKind, FieldSpec, FieldValue, FilterAttribute, Page, Record, RecordId, RecordSchema,
};
use serde::Deserialize;
use serde_json::{Map, Value};

// ========================
// Schemas
// ========================

pub static TODO_SCHEMA: RecordSchema = RecordSchema {
    kind: "todo",
    filter_attributes: &[
        FilterAttribute { name: "id", label: "ID" },
        FilterAttribute { name: "todo", label: "Todo" },
        FilterAttribute { name: "userId", label: "User ID" },
    ],
    default_filter: "todo",
    fields: &[
        FieldSpec { name: "todo", label: "Todo", kind: FieldKind::RequiredText },
        FieldSpec { name: "completed", label: "Completed", kind: FieldKind::Flag },
        FieldSpec { name: "userId", label: "User ID", kind: FieldKind::Reference { related: "employee" } },
    ],
};

pub static EMPLOYEE_SCHEMA: RecordSchema = RecordSchema {
    kind: "user",
    filter_attributes: &[
        FilterAttribute { name: "name", label: "Name" },
        FilterAttribute { name: "email", label: "Email" },
        FilterAttribute { name: "id", label: "ID" },
    ],
    default_filter: "name",
    fields: &[
        FieldSpec { name: "FirstName", label: "First name", kind: FieldKind::RequiredText },
        FieldSpec { name: "LastName", label: "Last name", kind: FieldKind::RequiredText },
        FieldSpec { name: "UserName", label: "Username", kind: FieldKind::RequiredText },
        FieldSpec { name: "Email", label: "Email", kind: FieldKind::RequiredText },
        FieldSpec { name: "Age", label: "Age", kind: FieldKind::PositiveNumber },
    ],
};

// ========================
// Wire Types
// ========================

/// Strapi pagination block (`pageInfo` in GraphQL, `meta.pagination` in REST)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    #[serde(default)]
    pub page_count: usize,
    pub total: usize,
}

/// Owner reference embedded in a todo
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeRef {
    #[serde(rename = "documentId")]
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoNode {
    pub document_id: String,
    #[serde(default)]
    pub todo: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub user_id: Option<EmployeeRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeNode {
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(rename = "FirstName", default)]
    pub first_name: String,
    #[serde(rename = "LastName", default)]
    pub last_name: String,
    #[serde(rename = "UserName", default)]
    pub user_name: String,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "Age", default)]
    pub age: Option<i64>,
}

/// Anything the backend returns that can be shown as a table row
pub trait IntoRecord {
    fn into_record(self) -> Option<Record>;
}

impl IntoRecord for TodoNode {
    fn into_record(self) -> Option<Record> {
        let id = RecordId::new(self.document_id)?;
        let owner = self.user_id.and_then(|u| RecordId::new(u.document_id));
        Some(
            Record::new(id)
                .with_field("todo", FieldValue::Text(self.todo))
                .with_field("completed", FieldValue::Flag(self.completed.unwrap_or(false)))
                .with_field("userId", FieldValue::Reference(owner)),
        )
    }
}

impl IntoRecord for EmployeeNode {
    fn into_record(self) -> Option<Record> {
        let id = RecordId::new(self.document_id)?;
        Some(
            Record::new(id)
                .with_field("FirstName", FieldValue::Text(self.first_name))
                .with_field("LastName", FieldValue::Text(self.last_name))
                .with_field("UserName", FieldValue::Text(self.user_name))
                .with_field("Email", FieldValue::Text(self.email))
                .with_field("Age", self.age.map(FieldValue::Number).unwrap_or(FieldValue::Null)),
        )
    }
}

/// Build a `Page` from backend nodes; rows without an id are dropped.
pub fn page_from_nodes<N: IntoRecord>(nodes: Vec<N>, info: &PageInfo) -> Page {
    Page {
        records: nodes.into_iter().filter_map(IntoRecord::into_record).collect(),
        page_index: info.page.saturating_sub(1),
        page_size: info.page_size.max(1),
        total: info.total,
    }
}

/// Mutation input object (`TodoInput` / `EmployeeInput`) for a draft
pub fn draft_to_input(schema: &RecordSchema, draft: &Draft) -> Map<String, Value> {
    schema
        .fields
        .iter()
        .map(|spec| {
            let value = match draft.get(spec.name) {
                Some(FieldValue::Text(s)) => Value::String(s.clone()),
                Some(FieldValue::Flag(b)) => Value::Bool(*b),
                Some(FieldValue::Number(n)) => Value::from(*n),
                Some(FieldValue::Reference(Some(id))) => Value::String(id.to_string()),
                Some(FieldValue::Reference(None)) | Some(FieldValue::Null) | None => Value::Null,
            };
            (spec.name.to_string(), value)
        })
        .collect()
}
