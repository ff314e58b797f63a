//! Todo Admin App
//!
//! Top-level routing: the login page, or the navbar plus a table page when
//! a session is present.

use leptos::prelude::*;
use list_view::SessionStore;
use reactive_stores::Store;

use crate::components::{LoginPage, Navbar, TodosPage, UsersPage};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::session::BrowserSessionStore;
use crate::store::{AppState, AppStateStoreFields, AppStore, Route};

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::load();
    log::info!("API at {} ({:?} todos)", config.api_base_url, config.todo_backend);

    let session = BrowserSessionStore.session();
    let store: AppStore = Store::new(AppState::new(
        session.as_ref().and_then(|s| s.user_name.clone()),
        session.is_some(),
    ));
    let ctx = AppContext::new(config, store);

    provide_context(store);
    provide_context(ctx.clone());

    view! {
        {move || {
            let route = store.route().get();
            // Protected pages fall back to login once the token is gone
            if route.is_protected() && ctx.sessions.token().is_none() {
                return view! { <LoginPage /> }.into_any();
            }
            match route {
                Route::Login => view! { <LoginPage /> }.into_any(),
                Route::Todos => view! { <Navbar /> <main class="main-content"><TodosPage /></main> }.into_any(),
                Route::Users => view! { <Navbar /> <main class="main-content"><UsersPage /></main> }.into_any(),
            }
        }}
    }
}
