//! Query Parameters
//!
//! What the list view asks the data source for.

use serde::{Deserialize, Serialize};

/// Search/filter/pagination snapshot for one list request.
///
/// `filter_attribute` is always one of the owning schema's filter attributes;
/// the controller checks it before it ever lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub search_text: String,
    pub filter_attribute: String,
    pub page_index: usize,
    pub page_size: usize,
}

impl QueryParams {
    pub fn new(filter_attribute: &str, page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            filter_attribute: filter_attribute.to_string(),
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Trimmed search text, or `None` when the filter should not be applied
    pub fn active_search(&self) -> Option<&str> {
        let text = self.search_text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
