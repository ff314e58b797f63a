//! List View Driver
//!
//! Runs controller tickets against the data source on a single-threaded
//! event loop. The controller is only borrowed between `.await` points, so
//! several operations may be in flight at once; the controller's sequence
//! guards decide which results are applied.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use crate::controller::{CommitOp, FetchOutcome, FetchTicket, ListViewController, ListViewState, NotificationLevel};
use crate::domain::{FieldKind, FieldValue, ListViewError, ListViewResult, RecordId, Surface};
use crate::traits::{DataSource, Navigator, SessionStore, Timer};

pub struct ListView {
    controller: RefCell<ListViewController>,
    source: Rc<dyn DataSource>,
    timer: Rc<dyn Timer>,
    session: Rc<dyn SessionStore>,
    navigator: Rc<dyn Navigator>,
    observer: RefCell<Option<Rc<dyn Fn()>>>,
}

impl ListView {
    pub fn new(
        controller: ListViewController,
        source: Rc<dyn DataSource>,
        timer: Rc<dyn Timer>,
        session: Rc<dyn SessionStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self {
            controller: RefCell::new(controller),
            source,
            timer,
            session,
            navigator,
            observer: RefCell::new(None),
        }
    }

    /// Called after every state change (e.g. to bump a UI signal)
    pub fn set_observer(&self, observer: impl Fn() + 'static) {
        *self.observer.borrow_mut() = Some(Rc::new(observer));
    }

    fn changed(&self) {
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer();
        }
    }

    pub fn state(&self) -> ListViewState {
        self.controller.borrow().snapshot()
    }

    pub fn with_controller<R>(&self, f: impl FnOnce(&ListViewController) -> R) -> R {
        f(&self.controller.borrow())
    }

    /// Apply `f` to the controller, then notify the observer
    fn update<R>(&self, f: impl FnOnce(&mut ListViewController) -> R) -> R {
        let result = f(&mut self.controller.borrow_mut());
        self.changed();
        result
    }

    // ========================
    // Lifecycle
    // ========================

    /// First load: requires a session, then loads related lists and page 0.
    ///
    /// A related list that fails to load is reported but does not stop the
    /// page from loading; only an auth failure does.
    pub async fn open(&self) -> ListViewResult<()> {
        if self.session.token().is_none() {
            self.handle_error(&ListViewError::Auth);
            return Err(ListViewError::Auth);
        }
        let related = self.load_related_options().await;
        if related == Err(ListViewError::Auth) {
            return related;
        }
        self.refresh().await.and(related)
    }

    /// Refetch the current page
    pub async fn refresh(&self) -> ListViewResult<()> {
        let ticket = self.update(|c| c.begin_fetch());
        self.run_fetch(ticket).await
    }

    async fn run_fetch(&self, mut ticket: FetchTicket) -> ListViewResult<()> {
        loop {
            let result = self.source.list_page(ticket.params()).await;
            match self.update(|c| c.apply_fetch(ticket, result)) {
                FetchOutcome::Applied | FetchOutcome::Stale => return Ok(()),
                FetchOutcome::Reissue(next) => ticket = next,
                FetchOutcome::Failed(err) => {
                    self.handle_error(&err);
                    return Err(err);
                }
            }
        }
    }

    /// Load option lists for every reference field.
    ///
    /// Failures become error notifications and the remaining fields are
    /// still tried; the first failure is returned.
    pub async fn load_related_options(&self) -> ListViewResult<()> {
        let schema = self.with_controller(|c| c.schema());
        let mut first_error = None;
        for spec in schema.fields {
            if let FieldKind::Reference { related } = spec.kind {
                match self.source.list_related(spec.name).await {
                    Ok(ids) => {
                        info!("[{}] loaded {} {} options", schema.kind, ids.len(), related);
                        self.update(|c| c.set_related_options(spec.name, ids));
                    }
                    Err(err) => {
                        let err = ListViewError::from(err);
                        warn!("[{}] loading {} options failed: {}", schema.kind, related, err);
                        if err == ListViewError::Auth {
                            self.handle_error(&err);
                            return Err(err);
                        }
                        self.update(|c| {
                            c.notify(NotificationLevel::Error, format!("Could not load {} options: {}", related, err))
                        });
                        first_error.get_or_insert(err);
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    // ========================
    // Query Parameters
    // ========================

    /// Update the search box and, after the debounce window, refetch.
    ///
    /// Calls superseded by newer input return without fetching.
    pub async fn search(&self, text: impl Into<String>) -> ListViewResult<()> {
        let ticket = self.update(|c| c.set_search_text(text));
        let debounce = self.with_controller(|c| c.config().debounce());
        self.timer.sleep(debounce).await;
        match self.update(|c| c.settle_search(ticket)) {
            Some(fetch) => self.run_fetch(fetch).await,
            None => Ok(()),
        }
    }

    pub async fn set_filter_attribute(&self, attr: &str) -> ListViewResult<()> {
        let ticket = self.update(|c| c.set_filter_attribute(attr))?;
        self.run_fetch(ticket).await
    }

    pub async fn set_page(&self, index: i64) -> ListViewResult<()> {
        let ticket = self.update(|c| c.set_page(index))?;
        self.run_fetch(ticket).await
    }

    pub async fn set_page_size(&self, size: i64) -> ListViewResult<()> {
        let ticket = self.update(|c| c.set_page_size(size))?;
        self.run_fetch(ticket).await
    }

    // ========================
    // Editing
    // ========================

    pub fn begin_edit(&self, id: &RecordId) -> ListViewResult<()> {
        self.update(|c| c.begin_edit(id)).map(|_| ())
    }

    pub fn begin_add(&self) -> ListViewResult<()> {
        self.update(|c| c.begin_add()).map(|_| ())
    }

    pub fn cancel_edit(&self) {
        self.update(|c| c.cancel_edit());
    }

    pub fn update_draft_field(&self, field: &str, value: FieldValue) -> ListViewResult<()> {
        self.update(|c| c.update_draft_field(field, value))
    }

    /// Parse raw form input with the field's kind, then update the draft
    pub fn update_draft_input(&self, field: &str, raw: &str) -> ListViewResult<()> {
        let spec = self
            .with_controller(|c| c.schema().field(field).copied())
            .ok_or_else(|| ListViewError::InvalidAttribute(field.to_string()))?;
        self.update_draft_field(field, spec.kind.parse_input(raw))
    }

    /// Validate and send the open draft; refetch on success.
    pub async fn commit(&self) -> ListViewResult<()> {
        let ticket = self.update(|c| c.commit_draft())?;
        let result = match ticket.op() {
            CommitOp::Create(draft) => self.source.create(draft).await,
            CommitOp::Update(id, draft) => self.source.update(id, draft).await,
        };
        match self.update(|c| c.complete_commit(ticket, result)) {
            Ok(fetch) => self.run_fetch(fetch).await,
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    // ========================
    // Detail
    // ========================

    /// Open the read-only detail of a listed row and load its child records.
    pub async fn view_record(&self, id: &RecordId) -> ListViewResult<()> {
        let ticket = self.update(|c| c.begin_view(id))?;
        let result = self.source.list_children(ticket.id()).await;
        let outcome = self.update(|c| c.complete_view(ticket, result));
        if let Err(err) = &outcome {
            self.handle_error(err);
        }
        outcome
    }

    pub fn close_view(&self) {
        self.update(|c| c.close_view());
    }

    // ========================
    // Delete
    // ========================

    pub fn request_delete(&self, id: RecordId) {
        self.update(|c| c.request_delete(id));
    }

    pub fn cancel_delete(&self) {
        self.update(|c| c.cancel_delete());
    }

    /// Delete a record the user already acknowledged; refetch on success.
    pub async fn delete(&self, id: &RecordId) -> ListViewResult<()> {
        let ticket = self.update(|c| c.delete_record(id))?;
        let result = self.source.delete(ticket.id()).await;
        match self.update(|c| c.complete_delete(ticket, result)) {
            Ok(fetch) => self.run_fetch(fetch).await,
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    pub fn dismiss_notification(&self, id: u64) {
        self.update(|c| c.dismiss_notification(id));
    }

    fn handle_error(&self, err: &ListViewError) {
        if err.surface() == Surface::Redirect {
            warn!("session rejected, returning to login");
            self.session.clear();
            self.navigator.redirect_to_login();
        }
    }
}
