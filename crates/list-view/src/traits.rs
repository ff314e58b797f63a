//! External Collaborator Traits
//!
//! The list view talks to the outside world only through these seams.
//! Browser futures are not `Send`, so async traits are `?Send`.

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Draft, Page, QueryParams, Record, RecordId, SourceResult};

// ========================
// Data Source
// ========================

/// Remote persistence boundary (REST or GraphQL)
#[async_trait(?Send)]
pub trait DataSource {
    /// Fetch one page matching `params`
    async fn list_page(&self, params: &QueryParams) -> SourceResult<Page>;

    /// Create a record from a validated draft
    async fn create(&self, draft: &Draft) -> SourceResult<Record>;

    /// Replace the editable fields of `id`
    async fn update(&self, id: &RecordId, draft: &Draft) -> SourceResult<Record>;

    async fn delete(&self, id: &RecordId) -> SourceResult<()>;

    /// Valid ids for a reference field (e.g. employees for `todo.userId`)
    async fn list_related(&self, _field: &str) -> SourceResult<Vec<RecordId>> {
        Ok(Vec::new())
    }

    /// Records owned by `id` (e.g. an employee's todos) for its detail view
    async fn list_children(&self, _id: &RecordId) -> SourceResult<Vec<Record>> {
        Ok(Vec::new())
    }
}

// ========================
// Session
// ========================

/// Bearer token issued at login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Where a token survives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Survives browser restarts ("remember me")
    Remembered,
    /// Cleared when the tab closes
    Tab,
}

/// Authenticated session handed to data sources at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user_name: Option<String>,
}

impl Session {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_str())
    }
}

pub trait SessionStore {
    fn token(&self) -> Option<SessionToken>;

    fn user_name(&self) -> Option<String>;

    fn store(&self, session: &Session, persistence: Persistence);

    fn clear(&self);

    /// Current session, if a token is present
    fn session(&self) -> Option<Session> {
        self.token().map(|token| Session { token, user_name: self.user_name() })
    }
}

/// In-memory store for tests and non-browser hosts
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RefCell<Option<Session>>,
}

impl MemorySessionStore {
    pub fn with_session(session: Session) -> Self {
        Self { session: RefCell::new(Some(session)) }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<SessionToken> {
        self.session.borrow().as_ref().map(|s| s.token.clone())
    }

    fn user_name(&self) -> Option<String> {
        self.session.borrow().as_ref().and_then(|s| s.user_name.clone())
    }

    fn store(&self, session: &Session, _persistence: Persistence) {
        *self.session.borrow_mut() = Some(session.clone());
    }

    fn clear(&self) {
        self.session.borrow_mut().take();
    }
}

// ========================
// Navigation + Time
// ========================

/// Routing hook used when the session is gone
pub trait Navigator {
    fn redirect_to_login(&self);
}

/// Async sleep, supplied by the host event loop
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}
