//! Domain Layer
//!
//! Records, pages, query parameters, edit sessions and errors.
//! No I/O lives here.

mod edit;
mod error;
mod page;
mod query;
mod record;
mod schema;

pub use edit::{Draft, EditSession, EditTarget, ValidationErrors};
pub use error::{ListViewError, ListViewResult, SourceError, SourceResult, Surface, FORM_ERROR_KEY};
pub use page::Page;
pub use query::QueryParams;
pub use record::{FieldValue, Fields, Record, RecordId};
pub use schema::{FieldKind, FieldSpec, FilterAttribute, RecordSchema};
