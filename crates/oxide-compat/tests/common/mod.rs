#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use oxide_compat::{
    AsyncQueryExecutor, Cancellation, CompatError, QueryExecutor, RawQuery, SqlValue,
};

/// An executor that answers from scripted results and records every
/// statement it receives.
#[derive(Default)]
pub struct ScriptedExecutor {
    counts: RefCell<VecDeque<SqlValue>>,
    pages: RefCell<VecDeque<Vec<u32>>>,
    pub statements: RefCell<Vec<RawQuery>>,
    cancel_after_count: Option<Cancellation>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(self, count: i64) -> Self {
        self.counts.borrow_mut().push_back(SqlValue::Int(count));
        self
    }

    #[must_use]
    pub fn count_value(self, value: SqlValue) -> Self {
        self.counts.borrow_mut().push_back(value);
        self
    }

    #[must_use]
    pub fn page(self, rows: &[u32]) -> Self {
        self.pages.borrow_mut().push_back(rows.to_vec());
        self
    }

    /// Fires `cancel` once the first count query has been answered.
    #[must_use]
    pub fn cancel_after_count(mut self, cancel: Cancellation) -> Self {
        self.cancel_after_count = Some(cancel);
        self
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements
            .borrow()
            .iter()
            .map(|q| q.sql.clone())
            .collect()
    }

    pub fn round_trips(&self) -> usize {
        self.statements.borrow().len()
    }

    fn scalar(&self, sql: &str, params: &[SqlValue]) -> Result<Option<SqlValue>, CompatError> {
        self.record(sql, params);
        let value = self
            .counts
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("No scripted count for: {sql}"));
        if let Some(cancel) = &self.cancel_after_count {
            cancel.cancel();
        }
        Ok(Some(value))
    }

    fn rows(&self, sql: &str, params: &[SqlValue]) -> Vec<u32> {
        self.record(sql, params);
        self.pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("No scripted page for: {sql}"))
    }

    fn record(&self, sql: &str, params: &[SqlValue]) {
        self.statements
            .borrow_mut()
            .push(RawQuery::new(sql, params.to_vec()));
    }
}

impl QueryExecutor for ScriptedExecutor {
    type Row = u32;
    type Error = CompatError;

    fn execute_scalar(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Option<SqlValue>, CompatError> {
        self.scalar(sql, params)
    }

    fn execute_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<u32>, CompatError> {
        Ok(self.rows(sql, params))
    }
}

impl AsyncQueryExecutor for ScriptedExecutor {
    type Row = u32;
    type Error = CompatError;

    async fn execute_scalar(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Option<SqlValue>, CompatError> {
        self.scalar(sql, params)
    }

    async fn execute_rows(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<u32>, CompatError> {
        Ok(self.rows(sql, params))
    }
}
