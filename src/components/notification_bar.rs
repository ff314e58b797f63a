//! Notification Bar Component
//!
//! Stack of transient success/error messages, each with a dismiss button.

use leptos::prelude::*;
use list_view::{Notification, NotificationLevel};

#[component]
pub fn NotificationBar(
    #[prop(into)] notifications: Signal<Vec<Notification>>,
    #[prop(into)] on_dismiss: Callback<u64>,
) -> impl IntoView {
    view! {
        <div class="notification-bar">
            <For
                each=move || notifications.get()
                key=|n| n.id
                children=move |n| {
                    let id = n.id;
                    let class = match n.level {
                        NotificationLevel::Success => "notification success",
                        NotificationLevel::Error => "notification error",
                    };
                    view! {
                        <div class=class role="status">
                            <span class="notification-text">{n.message}</span>
                            <button class="dismiss-btn" on:click=move |_| on_dismiss.run(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
