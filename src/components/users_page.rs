//! Users Page
//!
//! Employees from the GraphQL API, listed and edited like todos. The detail
//! panel lists each employee's assigned todos.

use leptos::prelude::*;

use super::ListPage;
use crate::context::{use_app_context, AppContext};
use crate::models::{EMPLOYEE_SCHEMA, TODO_SCHEMA};

#[component]
pub fn UsersPage() -> impl IntoView {
    let ctx = use_app_context();
    ctx.list_view(&EMPLOYEE_SCHEMA, AppContext::employees_source)
        .map(|view| view! { <ListPage title="Users" view=view owned_schema=&TODO_SCHEMA /> })
}
