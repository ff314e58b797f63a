//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

/// Top-level pages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Login,
    Todos,
    Users,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Todos => "Todos",
            Route::Users => "Users",
        }
    }

    /// Pages that need a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Page currently shown
    pub route: Route,
    /// Display name of the signed-in user
    pub user_name: Option<String>,
}

impl AppState {
    /// Start on Todos when a session survived a reload
    pub fn new(user_name: Option<String>, signed_in: bool) -> Self {
        Self {
            route: if signed_in { Route::Todos } else { Route::Login },
            user_name,
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

pub fn store_navigate(store: &AppStore, route: Route) {
    store.route().set(route);
}

/// Record a successful login and open the todos table
pub fn store_sign_in(store: &AppStore, user_name: Option<String>) {
    store.user_name().set(user_name);
    store.route().set(Route::Todos);
}

pub fn store_sign_out(store: &AppStore) {
    store.user_name().set(None);
    store.route().set(Route::Login);
}
