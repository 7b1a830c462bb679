//! Counted, paginated reads over arbitrary SELECT statements.
//!
//! [`Paginator`] runs a count query, clamps the requested page to the
//! available range, fetches the page and retries when a page that should
//! exist comes back empty because rows were removed in between.

mod paginator;

pub use paginator::{Paginator, DEFAULT_MAX_RETRIES};

use serde::Serialize;

use crate::error::{CompatError, Result};

/// A request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Creates a request for the zero-based `page` of `page_size` rows.
    pub fn new(page: u64, page_size: u64) -> Result<Self> {
        if page_size == 0 {
            return Err(CompatError::InvalidPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// The requested zero-based page.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// The number of rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }
}

/// One page of results with the totals it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPage<T> {
    /// The page actually returned, possibly lower than the one requested.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Total number of rows the query returns.
    pub record_count: u64,
    /// Number of pages, `ceil(record_count / page_size)`.
    pub page_count: u64,
    /// The rows of this page.
    pub rows: Vec<T>,
}

impl<T> QueryPage<T> {
    /// Converts the rows, keeping the paging totals.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> QueryPage<U> {
        QueryPage {
            page: self.page,
            page_size: self.page_size,
            record_count: self.record_count,
            page_count: self.page_count,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }

    /// Converts the rows, stopping at the first error.
    pub fn try_map<U, E, F: FnMut(T) -> Result<U, E>>(self, f: F) -> Result<QueryPage<U>, E> {
        Ok(QueryPage {
            page: self.page,
            page_size: self.page_size,
            record_count: self.record_count,
            page_count: self.page_count,
            rows: self.rows.into_iter().map(f).collect::<Result<_, E>>()?,
        })
    }

    /// Returns whether the page has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    /// Returns whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// Number of pages needed for `record_count` rows.
#[must_use]
pub const fn page_count(record_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    record_count.div_ceil(page_size)
}

/// Clamps `page` into `0..page_count` (or to 0 when there are no pages).
#[must_use]
pub const fn clamp_page(page: u64, page_count: u64) -> u64 {
    if page >= page_count {
        page_count.saturating_sub(1)
    } else {
        page
    }
}
