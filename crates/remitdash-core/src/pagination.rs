//! Fixed-size pagination with clamped page indices

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// One page of a filtered result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based index actually served, after clamping
    pub page_index: usize,
    pub page_size: usize,
    pub total_count: usize,
    /// `0` when there are no records
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Pagination controls are only rendered for more than one page
    pub fn has_controls(&self) -> bool {
        self.total_pages > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn previous_page(&self) -> Option<usize> {
        (self.page_index > 1).then(|| self.page_index - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        (self.page_index < self.total_pages).then(|| self.page_index + 1)
    }

    /// Up to `window` page numbers centred on the current page
    pub fn page_numbers(&self, window: usize) -> Vec<usize> {
        if self.total_pages == 0 || window == 0 {
            return Vec::new();
        }
        let window = window.min(self.total_pages);
        let half = window / 2;
        let start = self
            .page_index
            .saturating_sub(half)
            .max(1)
            .min(self.total_pages - window + 1);
        (start..start + window).collect()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

/// Slices result sets into pages of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> CoreResult<Self> {
        if page_size == 0 {
            return Err(CoreError::ValidationError {
                message: "Page size must be greater than 0".to_string(),
            });
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(count / page_size)`
    pub fn total_pages(&self, count: usize) -> usize {
        (count + self.page_size - 1) / self.page_size
    }

    /// Clamp a requested 1-based index into `[1, total_pages]`
    pub fn clamp(&self, count: usize, requested: usize) -> usize {
        requested.clamp(1, self.total_pages(count).max(1))
    }

    /// `paginate(records, pageSize, pageIndex)`
    ///
    /// An out-of-range index is served as the nearest valid page rather than
    /// an empty one.
    pub fn paginate<T: Clone>(&self, records: &[T], requested: usize) -> Page<T> {
        let total_count = records.len();
        let total_pages = self.total_pages(total_count);
        let page_index = self.clamp(total_count, requested);

        if page_index != requested {
            log::debug!(
                "Clamped page {} to {} ({} records, {} pages)",
                requested, page_index, total_count, total_pages
            );
        }

        let items = records
            .iter()
            .skip((page_index - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect();

        Page {
            items,
            page_index,
            page_size: self.page_size,
            total_count,
            total_pages,
        }
    }
}
