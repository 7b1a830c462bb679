//! The count, clamp, fetch and retry loop.

use tracing::{debug, warn};

use super::{clamp_page, page_count, PageRequest, QueryPage};
use crate::dialect::Dialect;
use crate::error::{CompatError, Result};
use crate::executor::{AsyncQueryExecutor, Cancellation, QueryExecutor};
use crate::query::RawQuery;
use crate::rewrite::{check_pageable, to_count_query, to_paged_query};
use crate::value::SqlValue;

/// Extra count/fetch rounds allowed after an unexpectedly empty page.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Runs paginated reads for one dialect.
///
/// The count and the page fetch are two separate round trips without a
/// shared snapshot. When rows disappear in between, a page that was in
/// range comes back empty; the paginator then recounts and fetches again,
/// at most `max_retries` times. After that the last observed page is
/// returned as is.
///
/// # Example
///
/// ```rust
/// use oxide_compat::{Dialect, PageRequest, Paginator, RawQuery};
///
/// let paginator = Paginator::new(Dialect::Sqlite).max_retries(5);
/// let query = RawQuery::sql("SELECT id, name FROM users ORDER BY name");
/// let request = PageRequest::new(2, 25).unwrap();
/// # let _ = (paginator, query, request);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    dialect: Dialect,
    max_retries: u32,
}

impl Paginator {
    /// Creates a paginator with the default retry budget.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets the number of extra rounds allowed after an empty page.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the dialect used to build page queries.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Fetches one page through a blocking executor.
    pub fn fetch_page<E: QueryExecutor>(
        &self,
        executor: &E,
        query: &RawQuery,
        request: PageRequest,
    ) -> Result<QueryPage<E::Row>, E::Error> {
        let mut run = PagedRun::new(self, query, request)?;
        loop {
            let count = executor.execute_scalar(&run.count.sql, &run.count.params)?;
            let paged = run.page_query(count)?;
            let rows = executor.execute_rows(&paged.sql, &paged.params)?;
            if let Some(page) = run.finish(rows) {
                return Ok(page);
            }
        }
    }

    /// Fetches one page through an asynchronous executor.
    ///
    /// `cancel` is checked before every round trip.
    pub async fn fetch_page_async<E: AsyncQueryExecutor>(
        &self,
        executor: &E,
        query: &RawQuery,
        request: PageRequest,
        cancel: &Cancellation,
    ) -> Result<QueryPage<E::Row>, E::Error> {
        let mut run = PagedRun::new(self, query, request)?;
        loop {
            cancel.check()?;
            let count = executor
                .execute_scalar(&run.count.sql, &run.count.params)
                .await?;
            let paged = run.page_query(count)?;
            cancel.check()?;
            let rows = executor.execute_rows(&paged.sql, &paged.params).await?;
            if let Some(page) = run.finish(rows) {
                return Ok(page);
            }
        }
    }
}

/// State shared by the blocking and asynchronous loops.
struct PagedRun<'a> {
    paginator: &'a Paginator,
    query: &'a RawQuery,
    count: RawQuery,
    page_size: u64,
    page: u64,
    record_count: u64,
    page_count: u64,
    retries: u32,
}

impl<'a> PagedRun<'a> {
    fn new(paginator: &'a Paginator, query: &'a RawQuery, request: PageRequest) -> Result<Self> {
        check_pageable(&query.sql)?;
        Ok(Self {
            paginator,
            query,
            count: to_count_query(query, paginator.dialect)?,
            page_size: request.page_size(),
            page: request.page(),
            record_count: 0,
            page_count: 0,
            retries: 0,
        })
    }

    /// Records the count result, clamps the page and builds its query.
    fn page_query(&mut self, count: Option<SqlValue>) -> Result<RawQuery> {
        self.record_count = read_count(count)?;
        self.page_count = page_count(self.record_count, self.page_size);

        let clamped = clamp_page(self.page, self.page_count);
        if clamped != self.page {
            debug!(
                requested = self.page,
                clamped,
                page_count = self.page_count,
                "Requested page out of range, clamping"
            );
            self.page = clamped;
        }

        to_paged_query(
            self.query,
            self.paginator.dialect,
            self.page,
            self.page_size,
        )
    }

    /// Returns the finished page, or `None` when another round is needed.
    fn finish<T>(&mut self, rows: Vec<T>) -> Option<QueryPage<T>> {
        if rows.is_empty() && self.page > 0 {
            if self.retries < self.paginator.max_retries {
                self.retries += 1;
                debug!(
                    page = self.page,
                    record_count = self.record_count,
                    attempt = self.retries,
                    "Page came back empty, recounting"
                );
                return None;
            }
            warn!(
                page = self.page,
                record_count = self.record_count,
                max_retries = self.paginator.max_retries,
                "Page still empty after retries, returning it"
            );
        }

        Some(QueryPage {
            page: self.page,
            page_size: self.page_size,
            record_count: self.record_count,
            page_count: self.page_count,
            rows,
        })
    }
}

fn read_count(value: Option<SqlValue>) -> Result<u64> {
    let value = value.unwrap_or(SqlValue::Null);
    value
        .as_i64()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| CompatError::UnexpectedScalar(value.to_string()))
}
