//! Login Page Component
//!
//! Email/password form. A successful login stores the session (in
//! `localStorage` with "remember me", `sessionStorage` otherwise) and opens
//! the todos table.

use leptos::prelude::*;
use leptos::task::spawn_local;
use list_view::{Persistence, SessionStore, SourceError};

use crate::api;
use crate::context::use_app_context;
use crate::store::{store_sign_in, use_app_store};

/// Local check before any request is sent
fn missing_credentials(email: &str, password: &str) -> Option<&'static str> {
    if email.trim().is_empty() {
        Some("Email is required")
    } else if password.is_empty() {
        Some("Password is required")
    } else {
        None
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (remember, set_remember) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let email = email.get();
        let password = password.get();
        if let Some(message) = missing_credentials(&email, &password) {
            set_error.set(Some(message.to_string()));
            return;
        }
        set_error.set(None);
        set_submitting.set(true);
        let ctx = ctx.clone();
        let persistence = if remember.get() { Persistence::Remembered } else { Persistence::Tab };
        spawn_local(async move {
            match api::login(&ctx.config, email.trim(), &password).await {
                Ok(session) => {
                    log::info!("signed in as {}", session.user_name.as_deref().unwrap_or("unknown user"));
                    ctx.sessions.store(&session, persistence);
                    store_sign_in(&store, session.user_name.clone());
                }
                Err(err) => {
                    log::warn!("login failed: {}", err);
                    let message = match SourceError::from(err) {
                        SourceError::Auth | SourceError::Validation { .. } => "Invalid email or password".to_string(),
                        other => other.to_string(),
                    };
                    set_error.set(Some(message));
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <div class="login-page">
            <form class="login-card" on:submit=on_submit>
                <h2>"Login"</h2>
                <label>
                    "Email"
                    <input
                        type="email"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Password"
                    <input
                        type="password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                </label>
                <label class="remember-me">
                    <input
                        type="checkbox"
                        prop:checked=move || remember.get()
                        on:change=move |ev| set_remember.set(event_target_checked(&ev))
                    />
                    "Remember me"
                </label>
                {move || error.get().map(|message| view! { <div class="field-error">{message}</div> })}
                <button type="submit" disabled=move || submitting.get()>
                    {move || if submitting.get() { "Signing in..." } else { "Login" }}
                </button>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials() {
        assert_eq!(missing_credentials("  ", "pw"), Some("Email is required"));
        assert_eq!(missing_credentials("a@b.c", ""), Some("Password is required"));
        assert_eq!(missing_credentials("a@b.c", "pw"), None);
    }
}
