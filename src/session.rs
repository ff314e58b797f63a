//! Browser Session + Timer
//!
//! Web Storage backed `SessionStore` and a gloo-timers `Timer` for the list
//! views.

use std::time::Duration;

use async_trait::async_trait;
use list_view::{Persistence, Session, SessionStore, SessionToken, Timer};
use web_sys::Storage;

const TOKEN_KEY: &str = "token";
const USER_NAME_KEY: &str = "username";

/// Tokens live in `localStorage` when remembered, `sessionStorage` otherwise.
/// Reads check both, local first.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSessionStore;

impl BrowserSessionStore {
    fn local() -> Option<Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }

    fn tab() -> Option<Storage> {
        web_sys::window().and_then(|w| w.session_storage().ok().flatten())
    }

    fn read(key: &str) -> Option<String> {
        [Self::local(), Self::tab()]
            .into_iter()
            .flatten()
            .find_map(|storage| storage.get_item(key).ok().flatten())
    }
}

impl SessionStore for BrowserSessionStore {
    fn token(&self) -> Option<SessionToken> {
        Self::read(TOKEN_KEY).and_then(SessionToken::new)
    }

    fn user_name(&self) -> Option<String> {
        Self::read(USER_NAME_KEY)
    }

    fn store(&self, session: &Session, persistence: Persistence) {
        self.clear();
        let storage = match persistence {
            Persistence::Remembered => Self::local(),
            Persistence::Tab => Self::tab(),
        };
        let Some(storage) = storage else {
            log::error!("web storage unavailable, session not saved");
            return;
        };
        let mut result = storage.set_item(TOKEN_KEY, session.token.as_str());
        if let Some(name) = &session.user_name {
            result = result.and_then(|_| storage.set_item(USER_NAME_KEY, name));
        }
        if result.is_err() {
            log::error!("failed to write session to web storage");
        }
    }

    fn clear(&self) {
        for storage in [Self::local(), Self::tab()].into_iter().flatten() {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_NAME_KEY);
        }
    }
}

/// `Timer` on the browser event loop
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
