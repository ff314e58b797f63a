//! Todos Page

use leptos::prelude::*;

use super::ListPage;
use crate::context::{use_app_context, AppContext};
use crate::models::TODO_SCHEMA;

#[component]
pub fn TodosPage() -> impl IntoView {
    let ctx = use_app_context();
    ctx.list_view(&TODO_SCHEMA, AppContext::todos_source)
        .map(|view| view! { <ListPage title="Todos" view=view /> })
}
