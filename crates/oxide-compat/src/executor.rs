//! Collaborator interfaces for running statements.
//!
//! The crate never opens connections itself. Backends implement
//! [`QueryExecutor`] (blocking) or [`AsyncQueryExecutor`] and hand them to
//! the paginator explicitly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CompatError, Result};
use crate::value::SqlValue;

/// Runs statements on a blocking connection.
pub trait QueryExecutor {
    /// A result row.
    type Row;
    /// Backend error type. Compatibility errors must convert into it.
    type Error: From<CompatError>;

    /// Runs a statement and returns the first column of the first row.
    fn execute_scalar(&self, sql: &str, params: &[SqlValue])
        -> Result<Option<SqlValue>, Self::Error>;

    /// Runs a statement and returns all rows.
    fn execute_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Self::Row>, Self::Error>;
}

/// Runs statements on an asynchronous connection.
#[allow(async_fn_in_trait)]
pub trait AsyncQueryExecutor {
    /// A result row.
    type Row;
    /// Backend error type. Compatibility errors must convert into it.
    type Error: From<CompatError>;

    /// Runs a statement and returns the first column of the first row.
    async fn execute_scalar(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Option<SqlValue>, Self::Error>;

    /// Runs a statement and returns all rows.
    async fn execute_rows(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Self::Row>, Self::Error>;
}

/// Cooperative cancellation signal.
///
/// Clones share the same flag. Long-running operations check it before
/// every round trip and stop with [`CompatError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fails with [`CompatError::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CompatError::Cancelled)
        } else {
            Ok(())
        }
    }
}
