//! List View Controller
//!
//! Owns query parameters and the edit session for one table, and decides
//! which data-source responses are allowed to change what is displayed.
//!
//! The controller does no I/O. Operations that need the network return a
//! ticket; the caller performs the request and hands the result back
//! together with the ticket. Tickets carry a sequence number so that late
//! responses for superseded parameters are dropped instead of displayed.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::config::{EditConflictPolicy, FetchErrorPolicy, ListViewConfig};
use crate::domain::{
    Draft, EditSession, FieldValue, ListViewError, ListViewResult, Page, QueryParams, Record, RecordId,
    RecordSchema, SourceError, SourceResult, ValidationErrors,
};
use crate::validate::{validate_draft, RelatedOptions};


// ========================
// Tickets
// ========================

/// Issued for each keystroke; only the newest one settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// One list request and the parameters it was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    seq: u64,
    params: QueryParams,
}

impl FetchTicket {
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What `apply_fetch` did with a response
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Became the displayed page
    Applied,
    /// Parameters changed since the request was issued; ignored
    Stale,
    /// Current request failed
    Failed(ListViewError),
    /// Page index fell past the end; a fetch for the last page replaces it
    Reissue(FetchTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOp {
    Create(Draft),
    Update(RecordId, Draft),
}

/// A validated create/update waiting for the data source
#[derive(Debug, Clone, PartialEq)]
pub struct CommitTicket {
    op: CommitOp,
    edit_seq: u64,
}

impl CommitTicket {
    pub fn op(&self) -> &CommitOp {
        &self.op
    }
}

/// A confirmed delete waiting for the data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    id: RecordId,
}

impl DeleteTicket {
    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

/// A detail request for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTicket {
    id: RecordId,
    seq: u64,
}

impl ViewTicket {
    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Read-only view of one row and the records that belong to it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDetail {
    pub record: Record,
    pub children: Vec<Record>,
    pub loading: bool,
}

// ========================
// Notifications
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient, dismissible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

/// Everything a view needs to render, detached from the controller
#[derive(Debug, Clone, PartialEq)]
pub struct ListViewState {
    pub query: QueryParams,
    pub pending_search: String,
    pub records: Vec<Record>,
    pub total: usize,
    pub page_count: usize,
    pub loading: bool,
    pub error_banner: Option<String>,
    pub edit: EditSession,
    /// The open draft has a create/update in flight
    pub committing: bool,
    pub pending_delete: Option<RecordId>,
    pub detail: Option<RecordDetail>,
    pub notifications: Vec<Notification>,
    pub related: RelatedOptions,
}

// ========================
// Controller
// ========================

pub struct ListViewController {
    schema: &'static RecordSchema,
    config: ListViewConfig,
    query: QueryParams,
    pending_search: String,
    search_seq: u64,
    fetch_seq: u64,
    in_flight: Option<u64>,
    /// Last applied page; `None` before the first load or after a cleared error
    page: Option<Page>,
    stale: bool,
    error_banner: Option<String>,
    edit: EditSession,
    /// Bumped every time a session opens so late commits can't close a newer one
    edit_seq: u64,
    /// `edit_seq` of the session whose commit is in flight
    committing: Option<u64>,
    pending_delete: Option<RecordId>,
    detail: Option<RecordDetail>,
    detail_seq: u64,
    related: RelatedOptions,
    notifications: Vec<Notification>,
    next_notification: u64,
}

impl ListViewController {
    pub fn new(schema: &'static RecordSchema, config: ListViewConfig) -> Self {
        let query = QueryParams::new(schema.default_filter, config.default_page_size);
        Self {
            schema,
            config,
            query,
            pending_search: String::new(),
            search_seq: 0,
            fetch_seq: 0,
            in_flight: None,
            page: None,
            stale: true,
            error_banner: None,
            edit: EditSession::None,
            edit_seq: 0,
            committing: None,
            pending_delete: None,
            detail: None,
            detail_seq: 0,
            related: BTreeMap::new(),
            notifications: Vec::new(),
            next_notification: 1,
        }
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    pub fn config(&self) -> &ListViewConfig {
        &self.config
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Search text as typed, possibly not yet applied
    pub fn pending_search_text(&self) -> &str {
        &self.pending_search
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn records(&self) -> &[Record] {
        self.page.as_ref().map(|p| p.records.as_slice()).unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True until the page reflects the latest parameters and mutations
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn is_committing(&self) -> bool {
        self.edit.is_open() && self.committing == Some(self.edit_seq)
    }

    pub fn detail(&self) -> Option<&RecordDetail> {
        self.detail.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&RecordId> {
        self.pending_delete.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn related_options(&self, field: &str) -> &[RecordId] {
        self.related.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn snapshot(&self) -> ListViewState {
        let (total, page_count) = self
            .page
            .as_ref()
            .map(|p| (p.total, p.page_count()))
            .unwrap_or((0, 0));
        ListViewState {
            query: self.query.clone(),
            pending_search: self.pending_search.clone(),
            records: self.records().to_vec(),
            total,
            page_count,
            loading: self.is_loading(),
            error_banner: self.error_banner.clone(),
            edit: self.edit.clone(),
            committing: self.is_committing(),
            pending_delete: self.pending_delete.clone(),
            detail: self.detail.clone(),
            notifications: self.notifications.clone(),
            related: self.related.clone(),
        }
    }

    // ========================
    // Query Parameters
    // ========================

    /// Record the typed text now; it takes effect when its ticket settles.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> SearchTicket {
        self.pending_search = text.into();
        self.search_seq += 1;
        SearchTicket(self.search_seq)
    }

    /// Apply the pending search text if `ticket` is still the newest.
    ///
    /// Returns a fetch only when the effective search text actually changed.
    pub fn settle_search(&mut self, ticket: SearchTicket) -> Option<FetchTicket> {
        if ticket.0 != self.search_seq {
            debug!("[{}] search ticket {} superseded", self.schema.kind, ticket.0);
            return None;
        }
        if self.pending_search == self.query.search_text {
            return None;
        }
        self.query.search_text = self.pending_search.clone();
        self.query.page_index = 0;
        Some(self.begin_fetch())
    }

    pub fn set_filter_attribute(&mut self, attr: &str) -> ListViewResult<FetchTicket> {
        if !self.schema.is_filter_attribute(attr) {
            warn!("[{}] rejected filter attribute `{}`", self.schema.kind, attr);
            return Err(ListViewError::InvalidAttribute(attr.to_string()));
        }
        self.query.filter_attribute = attr.to_string();
        self.query.page_index = 0;
        Ok(self.begin_fetch())
    }

    pub fn set_page(&mut self, index: i64) -> ListViewResult<FetchTicket> {
        let out_of_range = ListViewError::InvalidRange { what: "page index", value: index };
        let index = usize::try_from(index).map_err(|_| out_of_range.clone())?;
        if let Some(page) = &self.page {
            if !page.contains_index(index) {
                warn!("[{}] page {} outside 0..{}", self.schema.kind, index, page.page_count());
                return Err(out_of_range);
            }
        }
        self.query.page_index = index;
        Ok(self.begin_fetch())
    }

    /// Change rows per page; always returns to the first page.
    pub fn set_page_size(&mut self, size: i64) -> ListViewResult<FetchTicket> {
        let size = usize::try_from(size)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or(ListViewError::InvalidRange { what: "page size", value: size })?;
        self.query.page_size = size;
        self.query.page_index = 0;
        Ok(self.begin_fetch())
    }

    // ========================
    // Fetching
    // ========================

    /// Issue a list request for the current parameters.
    ///
    /// Any request issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_seq += 1;
        self.in_flight = Some(self.fetch_seq);
        self.stale = true;
        debug!(
            "[{}] fetch #{} page={} size={} filter={} search={:?}",
            self.schema.kind,
            self.fetch_seq,
            self.query.page_index,
            self.query.page_size,
            self.query.filter_attribute,
            self.query.search_text
        );
        FetchTicket { seq: self.fetch_seq, params: self.query.clone() }
    }

    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: SourceResult<Page>) -> FetchOutcome {
        if ticket.seq != self.fetch_seq || ticket.params != self.query {
            debug!("[{}] discarding stale response #{} (latest #{})", self.schema.kind, ticket.seq, self.fetch_seq);
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                if page.records.is_empty() && page.total > 0 && self.query.page_index > page.last_index() {
                    self.query.page_index = page.last_index();
                    debug!("[{}] page past end, moving to {}", self.schema.kind, self.query.page_index);
                    return FetchOutcome::Reissue(self.begin_fetch());
                }
                debug!("[{}] applied #{}: {} of {} records", self.schema.kind, ticket.seq, page.records.len(), page.total);
                if matches!(&self.edit, EditSession::Editing { id, .. } if page.find(id).is_none()) {
                    debug!("[{}] edited row {:?} left the page, closing it", self.schema.kind, self.edit.target());
                    self.edit.close();
                }
                self.error_banner = None;
                self.stale = false;
                self.page = Some(page);
                FetchOutcome::Applied
            }
            Err(err) => {
                let err = ListViewError::from(err);
                warn!("[{}] fetch #{} failed: {}", self.schema.kind, ticket.seq, err);
                if err != ListViewError::Auth {
                    self.error_banner = Some(err.to_string());
                    if self.config.fetch_error_policy == FetchErrorPolicy::ClearPage {
                        self.page = None;
                    }
                }
                FetchOutcome::Failed(err)
            }
        }
    }

    // ========================
    // Edit Session
    // ========================

    /// Open an inline edit for a row on the current page.
    ///
    /// Returns the unsaved session that was discarded, if any.
    pub fn begin_edit(&mut self, id: &RecordId) -> ListViewResult<Option<EditSession>> {
        if self.edit.is_editing(id) {
            return Ok(None);
        }
        self.check_edit_conflict()?;
        let record = self
            .page
            .as_ref()
            .and_then(|p| p.find(id))
            .ok_or_else(|| ListViewError::NotFound(id.to_string()))?;
        let draft = Draft::new(self.schema.editable_fields(&record.fields));
        Ok(self.open_session(EditSession::editing(id.clone(), draft)))
    }

    /// Open the inline add-row.
    pub fn begin_add(&mut self) -> ListViewResult<Option<EditSession>> {
        if matches!(self.edit, EditSession::Adding { .. }) {
            return Ok(None);
        }
        self.check_edit_conflict()?;
        let draft = Draft::new(self.schema.initial_fields());
        Ok(self.open_session(EditSession::adding(draft)))
    }

    pub fn cancel_edit(&mut self) -> EditSession {
        self.edit.close()
    }

    fn check_edit_conflict(&self) -> ListViewResult<()> {
        if self.edit.is_open() && self.config.edit_conflict_policy == EditConflictPolicy::KeepExisting {
            return Err(ListViewError::EditInProgress);
        }
        Ok(())
    }

    fn open_session(&mut self, session: EditSession) -> Option<EditSession> {
        let previous = std::mem::replace(&mut self.edit, session);
        self.edit_seq += 1;
        if previous.is_open() {
            debug!("[{}] discarding unsaved draft {:?}", self.schema.kind, previous.target());
            Some(previous)
        } else {
            None
        }
    }

    /// Change one draft field and clear that field's error only.
    pub fn update_draft_field(&mut self, field: &str, value: FieldValue) -> ListViewResult<()> {
        if self.schema.field(field).is_none() {
            return Err(ListViewError::InvalidAttribute(field.to_string()));
        }
        let draft = self.edit.draft_mut().ok_or(ListViewError::NoEditSession)?;
        draft.set(field, value);
        if let Some(errors) = self.edit.errors_mut() {
            errors.remove(field);
        }
        Ok(())
    }

    pub fn validate_draft(&self) -> ListViewResult<ValidationErrors> {
        let draft = self.edit.draft().ok_or(ListViewError::NoEditSession)?;
        Ok(validate_draft(self.schema, draft, &self.related))
    }

    /// Validate the open draft and, if clean, produce the create/update to send.
    ///
    /// Invalid drafts never produce a ticket; their errors are stored on the session.
    ///
    /// Refuses while the same session already has a commit in flight.
    pub fn commit_draft(&mut self) -> ListViewResult<CommitTicket> {
        if self.is_committing() {
            debug!("[{}] commit already in flight", self.schema.kind);
            return Err(ListViewError::CommitInProgress);
        }
        let errors = self.validate_draft()?;
        if !errors.is_empty() {
            debug!("[{}] commit blocked by {} invalid field(s)", self.schema.kind, errors.len());
            if let Some(session_errors) = self.edit.errors_mut() {
                *session_errors = errors.clone();
            }
            return Err(ListViewError::Validation(errors));
        }

        let op = match &self.edit {
            EditSession::Editing { id, draft, .. } => CommitOp::Update(id.clone(), trimmed(draft)),
            EditSession::Adding { draft, .. } => CommitOp::Create(trimmed(draft)),
            EditSession::None => return Err(ListViewError::NoEditSession),
        };
        info!("[{}] committing {}", self.schema.kind, describe(&op));
        self.committing = Some(self.edit_seq);
        Ok(CommitTicket { op, edit_seq: self.edit_seq })
    }

    /// Reconcile after the data source answered a commit.
    ///
    /// On success the session closes and a refetch is returned.
    pub fn complete_commit(&mut self, ticket: CommitTicket, result: SourceResult<Record>) -> ListViewResult<FetchTicket> {
        let same_session = ticket.edit_seq == self.edit_seq;
        if self.committing == Some(ticket.edit_seq) {
            self.committing = None;
        }
        match result {
            Ok(record) => {
                info!("[{}] {} succeeded ({})", self.schema.kind, describe(&ticket.op), record.id);
                if same_session {
                    self.edit.close();
                }
                let verb = match ticket.op {
                    CommitOp::Create(_) => "added",
                    CommitOp::Update(..) => "updated",
                };
                self.notify(NotificationLevel::Success, format!("{} {} successfully", capitalize(self.schema.kind), verb));
                Ok(self.begin_fetch())
            }
            Err(err) => Err(self.mutation_failed(err, same_session)),
        }
    }

    // ========================
    // Detail
    // ========================

    /// Show a row read-only; returns the request for its child records.
    pub fn begin_view(&mut self, id: &RecordId) -> ListViewResult<ViewTicket> {
        let record = self
            .page
            .as_ref()
            .and_then(|p| p.find(id))
            .cloned()
            .ok_or_else(|| ListViewError::NotFound(id.to_string()))?;
        self.detail_seq += 1;
        self.detail = Some(RecordDetail { record, children: Vec::new(), loading: true });
        Ok(ViewTicket { id: id.clone(), seq: self.detail_seq })
    }

    /// Attach child records, unless the detail was closed or replaced meanwhile.
    pub fn complete_view(&mut self, ticket: ViewTicket, result: SourceResult<Vec<Record>>) -> ListViewResult<()> {
        if ticket.seq != self.detail_seq {
            return Ok(());
        }
        let Some(detail) = self.detail.as_mut() else {
            return Ok(());
        };
        detail.loading = false;
        match result {
            Ok(children) => {
                debug!("[{}] {} has {} related record(s)", self.schema.kind, ticket.id, children.len());
                detail.children = children;
                Ok(())
            }
            Err(err) => {
                let err = ListViewError::from(err);
                warn!("[{}] loading details of {} failed: {}", self.schema.kind, ticket.id, err);
                if err != ListViewError::Auth {
                    self.notify(NotificationLevel::Error, err.to_string());
                }
                Err(err)
            }
        }
    }

    pub fn close_view(&mut self) {
        self.detail = None;
        self.detail_seq += 1;
    }

    // ========================
    // Delete
    // ========================

    /// First step of a delete: ask the user to acknowledge.
    pub fn request_delete(&mut self, id: RecordId) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step of a delete; refuses unless `id` was acknowledged.
    pub fn delete_record(&mut self, id: &RecordId) -> ListViewResult<DeleteTicket> {
        if self.pending_delete.as_ref() != Some(id) {
            warn!("[{}] delete of {} without confirmation refused", self.schema.kind, id);
            return Err(ListViewError::ConfirmationRequired(id.clone()));
        }
        self.pending_delete = None;
        info!("[{}] deleting {}", self.schema.kind, id);
        Ok(DeleteTicket { id: id.clone() })
    }

    pub fn complete_delete(&mut self, ticket: DeleteTicket, result: SourceResult<()>) -> ListViewResult<FetchTicket> {
        match result {
            Ok(()) => {
                if self.edit.is_editing(&ticket.id) {
                    self.edit.close();
                }
                if self.detail.as_ref().is_some_and(|d| d.record.id == ticket.id) {
                    self.detail = None;
                }
                self.notify(NotificationLevel::Success, format!("{} deleted", capitalize(self.schema.kind)));
                Ok(self.begin_fetch())
            }
            Err(err) => Err(self.mutation_failed(err, false)),
        }
    }

    fn mutation_failed(&mut self, err: SourceError, same_session: bool) -> ListViewError {
        let err = ListViewError::from(err);
        warn!("[{}] mutation failed: {}", self.schema.kind, err);
        match &err {
            ListViewError::Auth => {}
            ListViewError::Validation(server_errors) if same_session => {
                if let Some(errors) = self.edit.errors_mut() {
                    errors.extend(server_errors.clone());
                }
            }
            other => {
                self.notify(NotificationLevel::Error, other.to_string());
            }
        }
        err
    }

    // ========================
    // Related Lists + Notifications
    // ========================

    pub fn set_related_options(&mut self, field: &str, ids: Vec<RecordId>) {
        self.related.insert(field.to_string(), ids);
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let id = self.next_notification;
        self.next_notification += 1;
        self.notifications.push(Notification { id, level, message: message.into() });
        id
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }
}

fn trimmed(draft: &Draft) -> Draft {
    let fields = draft
        .fields
        .iter()
        .map(|(name, value)| {
            let value = match value {
                FieldValue::Text(s) => FieldValue::Text(s.trim().to_string()),
                other => other.clone(),
            };
            (name.clone(), value)
        })
        .collect();
    Draft::new(fields)
}

fn describe(op: &CommitOp) -> String {
    match op {
        CommitOp::Create(_) => "create".to_string(),
        CommitOp::Update(id, _) => format!("update {}", id),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
