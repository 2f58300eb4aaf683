use serde::Serialize;

/// One page of a filtered and sorted list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// 1-based page number actually served
    pub page: usize,

    pub page_size: usize,

    /// Items that passed the filter, across all pages
    pub total_items: usize,

    /// At least 1, even for an empty list
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
