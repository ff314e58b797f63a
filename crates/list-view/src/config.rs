//! List View Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens to the displayed page when a fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorPolicy {
    /// Keep the last good page and show an inline error banner
    #[default]
    RetainLastPage,
    /// Drop the page and show only the banner
    ClearPage,
}

/// What happens when an edit/add starts while another draft is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditConflictPolicy {
    /// Throw the open draft away
    #[default]
    DiscardExisting,
    /// Refuse with `EditInProgress` until the open draft is saved or cancelled
    KeepExisting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListViewConfig {
    /// Quiet period before search input is applied
    pub debounce_ms: u64,
    pub default_page_size: usize,
    /// Choices offered by the rows-per-page select
    pub page_size_options: Vec<usize>,
    pub fetch_error_policy: FetchErrorPolicy,
    pub edit_conflict_policy: EditConflictPolicy,
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            default_page_size: 10,
            page_size_options: vec![5, 10, 25],
            fetch_error_policy: FetchErrorPolicy::default(),
            edit_conflict_policy: EditConflictPolicy::default(),
        }
    }
}

impl ListViewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
