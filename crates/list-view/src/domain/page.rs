//! Page of Records
//!
//! The result of one list request plus pagination metadata.

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};

/// An ordered slice of records and the total count behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub records: Vec<Record>,
    /// Zero-based page index
    pub page_index: usize,
    /// Always >= 1
    pub page_size: usize,
    /// Total matching records across all pages
    pub total: usize,
}

impl Page {
    pub fn empty(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            page_index: 0,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    /// Number of pages, `ceil(total / page_size)`
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }

    /// `0 <= index < page_count`, or `index == 0` when there is nothing to show.
    pub fn contains_index(&self, index: usize) -> bool {
        if self.total == 0 {
            index == 0
        } else {
            index < self.page_count()
        }
    }

    /// Last valid index for this total
    pub fn last_index(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: usize, page_size: usize) -> Page {
        Page { records: Vec::new(), page_index: 0, page_size, total }
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page(0, 10).page_count(), 0);
        assert_eq!(page(10, 10).page_count(), 1);
        assert_eq!(page(11, 10).page_count(), 2);
    }

    #[test]
    fn test_contains_index_bounds() {
        assert!(page(0, 5).contains_index(0));
        assert!(!page(0, 5).contains_index(1));
        assert!(page(12, 5).contains_index(2));
        assert!(!page(12, 5).contains_index(3));
        assert_eq!(page(12, 5).last_index(), 2);
    }
}
