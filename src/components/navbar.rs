//! Navbar Component
//!
//! App title, page tabs, and the signed-in user's avatar menu with logout.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::{store_navigate, use_app_store, AppStateStoreFields, Route};

fn initial(name: &str) -> String {
    name.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_else(|| "U".to_string())
}

#[component]
pub fn Navbar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (menu_open, set_menu_open) = signal(false);

    let user_name = move || store.user_name().get().unwrap_or_else(|| "User".to_string());

    let tab = move |route: Route| {
        view! {
            <button
                class=move || if store.route().get() == route { "nav-tab active" } else { "nav-tab" }
                on:click=move |_| store_navigate(&store, route)
            >
                {route.title()}
            </button>
        }
    };

    view! {
        <nav class="navbar">
            <span class="navbar-title">"Todo App"</span>
            <div class="nav-tabs">
                {tab(Route::Todos)}
                {tab(Route::Users)}
            </div>
            <div class="user-menu">
                <button class="avatar" on:click=move |_| set_menu_open.update(|open| *open = !*open)>
                    {move || initial(&user_name())}
                </button>
                <Show when=move || menu_open.get()>
                    <div class="menu">
                        <span class="menu-item disabled">{user_name}</span>
                        <button
                            class="menu-item"
                            on:click={
                                let ctx = ctx.clone();
                                move |_| {
                                    set_menu_open.set(false);
                                    ctx.logout();
                                }
                            }
                        >
                            "Logout"
                        </button>
                    </div>
                </Show>
            </div>
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial() {
        assert_eq!(initial("ada"), "A");
        assert_eq!(initial(""), "U");
    }
}
