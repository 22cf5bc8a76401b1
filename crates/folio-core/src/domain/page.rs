use serde::{Deserialize, Serialize};

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(index: u64, size: u64) -> Self {
        Self { index, size }
    }
}

/// One page of a larger ordered result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based index of this page.
    pub index: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, index: u64, total_pages: u64) -> Self {
        Self {
            items,
            index,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.index >= 1
    }
}
