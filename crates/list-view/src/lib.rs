//! List View
//!
//! Search/filter/paginate/inline-edit state for a remote record table,
//! independent of any UI framework.
//!
//! Layered like this:
//! - domain: records, pages, query parameters, edit sessions, errors
//! - controller: the synchronous state machine (no I/O)
//! - view: async driver that runs controller tickets against a `DataSource`
//! - traits: seams to the data source, session store, router and timer

mod config;
mod controller;
mod domain;
mod traits;
mod validate;
mod view;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use config::{EditConflictPolicy, FetchErrorPolicy, ListViewConfig};
pub use controller::{
    CommitOp, CommitTicket, DeleteTicket, FetchOutcome, FetchTicket, ListViewController, ListViewState,
    Notification, NotificationLevel, RecordDetail, SearchTicket, ViewTicket,
};
pub use domain::*;
pub use traits::{
    DataSource, MemorySessionStore, Navigator, Persistence, Session, SessionStore, SessionToken, Timer,
};
pub use validate::{validate_draft, RelatedOptions};
pub use view::ListView;
