//! Pagination for list operations.

use serde::{Deserialize, Serialize};

/// Default page size when none is requested.
pub const DEFAULT_PER_PAGE: usize = 20;
/// Upper bound on requested page size.
pub const MAX_PER_PAGE: usize = 100;

/// A page request: zero-based page number plus page size.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
    /// Items per page, clamped to [`MAX_PER_PAGE`].
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

const fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl PageRequest {
    /// Create a page request, clamping the page size to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Offset of the first item on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: usize,
    /// Requested page size.
    pub per_page: usize,
    /// Total items across all pages.
    pub total_items: usize,
    /// Total number of pages.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut one page out of the full, already-sorted result set.
    #[must_use]
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let request = PageRequest::new(request.page, request.per_page);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(request.per_page);
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.per_page)
            .collect();

        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_items,
            total_pages,
        }
    }

    /// Map the items of this page, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_cuts_requested_page() {
        let page = Page::from_vec((0..45).collect(), PageRequest::new(1, 20));
        assert_eq!(page.items, (20..40).collect::<Vec<_>>());
        assert_eq!(page.total_items, 45);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = Page::from_vec(vec![1, 2, 3], PageRequest::new(5, 20));
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_per_page_is_clamped() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.per_page, 1);
        let request = PageRequest::new(0, 10_000);
        assert_eq!(request.per_page, MAX_PER_PAGE);
    }
}
