//! Error Taxonomy
//!
//! `SourceError` is what data-source adapters return. `ListViewError` is what
//! the controller hands to the view layer; every remote failure is translated
//! into it at the operation boundary.

use thiserror::Error;

use super::edit::ValidationErrors;
use super::record::RecordId;

/// Key for server-side validation messages not tied to a single field
pub const FORM_ERROR_KEY: &str = "_form";

/// Errors raised by a `DataSource` implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    /// 401/403 or missing/expired token
    #[error("not authenticated")]
    Auth,
    #[error("record {0} not found")]
    NotFound(String),
    /// Server-side validation rejection
    #[error("rejected by server: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// How an error reaches the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Programmer error, logged only
    Hidden,
    /// Per-field message next to the input
    Inline,
    /// Clear the session and go to the login page
    Redirect,
    /// Transient dismissible notification
    Notification,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListViewError {
    #[error("invalid filter attribute `{0}`")]
    InvalidAttribute(String),
    #[error("{what} out of range: {value}")]
    InvalidRange { what: &'static str, value: i64 },
    #[error("draft has {} invalid field(s)", .0.len())]
    Validation(ValidationErrors),
    #[error("session expired, please log in again")]
    Auth,
    #[error("network error: {0}")]
    Transport(String),
    #[error("record {0} not found")]
    NotFound(String),
    #[error("another edit is already in progress")]
    EditInProgress,
    #[error("this draft is already being saved")]
    CommitInProgress,
    #[error("deleting {0} requires confirmation")]
    ConfirmationRequired(RecordId),
    #[error("no edit session is open")]
    NoEditSession,
}

impl ListViewError {
    pub fn surface(&self) -> Surface {
        match self {
            ListViewError::InvalidAttribute(_)
            | ListViewError::InvalidRange { .. }
            | ListViewError::EditInProgress
            | ListViewError::CommitInProgress
            | ListViewError::ConfirmationRequired(_)
            | ListViewError::NoEditSession => Surface::Hidden,
            ListViewError::Validation(_) => Surface::Inline,
            ListViewError::Auth => Surface::Redirect,
            ListViewError::Transport(_) | ListViewError::NotFound(_) => Surface::Notification,
        }
    }
}

impl From<SourceError> for ListViewError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Transport(msg) => ListViewError::Transport(msg),
            SourceError::Auth => ListViewError::Auth,
            SourceError::NotFound(id) => ListViewError::NotFound(id),
            SourceError::Validation { field, message } => {
                let key = field.unwrap_or_else(|| FORM_ERROR_KEY.to_string());
                ListViewError::Validation(ValidationErrors::from([(key, message)]))
            }
        }
    }
}

pub type ListViewResult<T> = Result<T, ListViewError>;
