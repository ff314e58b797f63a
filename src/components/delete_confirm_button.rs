//! Delete Confirm Button Component
//!
//! Inline delete confirmation with confirm/cancel actions. Whether the
//! confirmation is showing is owned by the caller.

use leptos::prelude::*;

/// Inline delete confirmation button
///
/// Shows a × button initially. When requested, shows "Delete?" with ✓/✗ buttons.
///
/// # Arguments
/// * `button_class` - CSS class for the initial delete button
/// * `confirming` - whether the ✓/✗ pair is showing
/// * `on_request` / `on_confirm` / `on_cancel` - the three user actions
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into)] confirming: Signal<bool>,
    #[prop(into)] on_request: Callback<()>,
    #[prop(into)] on_confirm: Callback<()>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || !confirming.get()>
            <button
                class=button_class.clone()
                title="Delete"
                on:click=move |ev| {
                    ev.stop_propagation();
                    on_request.run(());
                }
            >
                "×"
            </button>
        </Show>
        <Show when=move || confirming.get()>
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Delete?"</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        on_cancel.run(());
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
