use std::cmp::Ordering;

use crate::models::page::Page;

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;
type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

/// Filter, sort and paginate an in-memory list in one step.
///
/// Every list page of the dashboard (instances, strategies, traces, users)
/// follows the same `paginate(sort(filter(list)))` shape; this is that
/// shape, parameterized by a predicate and a comparator.
pub struct ListQuery<'a, T> {
    predicate: Option<Predicate<'a, T>>,
    comparator: Option<Comparator<'a, T>>,
    page: usize,
    page_size: usize,
}

impl<'a, T: Clone> ListQuery<'a, T> {
    /// First page, `page_size` rows per page (clamped to at least 1).
    pub fn new(page_size: usize) -> Self {
        Self {
            predicate: None,
            comparator: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn sort_by(mut self, comparator: impl Fn(&T, &T) -> Ordering + 'a) -> Self {
        self.comparator = Some(Box::new(comparator));
        self
    }

    /// 1-based page number; 0 is treated as 1.
    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Apply the query. Sorting is stable; a page past the end is empty.
    pub fn apply(&self, items: &[T]) -> Page<T> {
        let mut selected: Vec<&T> = match &self.predicate {
            Some(predicate) => items.iter().filter(|item| predicate(item)).collect(),
            None => items.iter().collect(),
        };

        if let Some(comparator) = &self.comparator {
            selected.sort_by(|a, b| comparator(a, b));
        }

        let total_items = selected.len();
        let total_pages = total_items.div_ceil(self.page_size).max(1);
        let start = (self.page - 1).saturating_mul(self.page_size);

        let items = selected
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();

        Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages,
        }
    }
}

/// Case-insensitive substring match; an empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
