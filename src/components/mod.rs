//! UI Components
//!
//! Reusable Leptos components.

mod delete_confirm_button;
mod list_page;
mod login_page;
mod navbar;
mod notification_bar;
mod todos_page;
mod users_page;

pub use delete_confirm_button::DeleteConfirmButton;
pub use list_page::ListPage;
pub use login_page::LoginPage;
pub use navbar::Navbar;
pub use notification_bar::NotificationBar;
pub use todos_page::TodosPage;
pub use users_page::UsersPage;
