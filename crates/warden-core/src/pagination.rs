//! Pagination types for list operations.
//!
//! `offset` is a 1-based page number rather than a row offset, so the
//! request `limit=10, offset=3` covers rows 21 through 30.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A request for a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageRequest {
    /// The number of items per page.
    #[validate(range(min = 1, message = "Page size must be at least 1"))]
    pub limit: u64,
    /// The page number (1-indexed).
    #[validate(range(min = 1, message = "Page number must be at least 1"))]
    pub offset: u64,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_LIMIT: u64 = 10;
    /// The first page number.
    pub const FIRST_PAGE: u64 = 1;

    /// Creates a new page request.
    #[must_use]
    pub const fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Returns the number of rows to skip in the durable store.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.offset.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::FIRST_PAGE)
    }
}

/// Navigation metadata for a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Number of matching records, ignoring limit and offset.
    pub total: u64,
    /// The current page number.
    pub page: u64,
    /// The page size.
    pub size: u64,
    /// The first page number.
    pub first: u64,
    /// The last page number (at least 1).
    pub last: u64,
    /// The previous page, if any.
    pub previous: Option<u64>,
    /// The next page, if any.
    pub next: Option<u64>,
}

impl PageInfo {
    /// Computes navigation metadata for `request` over `total` records.
    #[must_use]
    pub fn paginate(request: PageRequest, total: u64) -> Self {
        let size = request.limit.max(1);
        let last = total.div_ceil(size).max(1);
        let page = request.offset;

        Self {
            total,
            page,
            size,
            first: PageRequest::FIRST_PAGE,
            last,
            previous: (page > PageRequest::FIRST_PAGE).then(|| page - 1),
            next: (page < last).then(|| page + 1),
        }
    }
}

/// A page of results together with its navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Navigation metadata.
    pub page_info: PageInfo,
    /// The items on this page.
    pub page_data: Vec<T>,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub fn new(page_data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            page_info: PageInfo::paginate(request, total),
            page_data,
        }
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            page_info: self.page_info,
            page_data: self.page_data.into_iter().map(f).collect(),
        }
    }

    /// Returns true if the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_data.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.page_data.len()
    }
}
