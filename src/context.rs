//! Application Context
//!
//! Shared services provided via Leptos Context API, and the wiring that
//! turns them into list views for the table pages.

use std::rc::Rc;

use leptos::prelude::*;
use list_view::{
    DataSource, ListView, ListViewController, Navigator, RecordSchema, Session, SessionStore,
};

use crate::api::{ApiClient, GraphqlEmployees, GraphqlTodos, RestTodos};
use crate::config::{AppConfig, TodoBackend};
use crate::session::{BrowserSessionStore, GlooTimer};
use crate::store::{store_sign_out, AppStore};

/// Sends the app back to the login page when a list view loses its session
#[derive(Clone, Copy)]
pub struct StoreNavigator {
    store: AppStore,
}

impl Navigator for StoreNavigator {
    fn redirect_to_login(&self) {
        store_sign_out(&self.store);
    }
}

/// App-wide services provided via context
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub sessions: BrowserSessionStore,
    store: AppStore,
}

impl AppContext {
    pub fn new(config: AppConfig, store: AppStore) -> Self {
        Self { config, sessions: BrowserSessionStore, store }
    }

    /// Clear the stored session and return to login
    pub fn logout(&self) {
        self.sessions.clear();
        store_sign_out(&self.store);
        log::info!("signed out");
    }

    fn client(&self, session: Session) -> ApiClient {
        ApiClient::new(self.config.clone(), session)
    }

    pub fn todos_source(&self, session: Session) -> Rc<dyn DataSource> {
        match self.config.todo_backend {
            TodoBackend::Graphql => Rc::new(GraphqlTodos::new(self.client(session))),
            TodoBackend::Rest => Rc::new(RestTodos::new(self.client(session))),
        }
    }

    pub fn employees_source(&self, session: Session) -> Rc<dyn DataSource> {
        Rc::new(GraphqlEmployees::new(self.client(session)))
    }

    /// List view for `schema`, or `None` (after redirecting) without a session
    pub fn list_view(
        &self,
        schema: &'static RecordSchema,
        source: impl FnOnce(&Self, Session) -> Rc<dyn DataSource>,
    ) -> Option<Rc<ListView>> {
        let navigator = StoreNavigator { store: self.store };
        let Some(session) = self.sessions.session() else {
            navigator.redirect_to_login();
            return None;
        };
        let controller = ListViewController::new(schema, self.config.list_view.clone());
        Some(Rc::new(ListView::new(
            controller,
            source(self, session),
            Rc::new(GlooTimer),
            Rc::new(self.sessions),
            Rc::new(navigator),
        )))
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
