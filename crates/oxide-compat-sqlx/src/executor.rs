//! Statement execution on a SQLite pool.

use oxide_compat::{
    AsyncQueryExecutor, Cancellation, CompatError, Dialect, DialectProvider, PageRequest,
    Paginator, QueryPage, RawQuery, SqlValue,
};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, TypeInfo, ValueRef};
use tracing::debug;

use crate::dialect::dialect_of;
use crate::error::{CompatSqlxError, Result};

/// Runs compatibility-layer statements on a [`SqlitePool`].
///
/// # Example
///
/// ```rust,no_run
/// use oxide_compat::{PageRequest, RawQuery};
/// use oxide_compat_sqlx::SqliteExecutor;
/// use sqlx::SqlitePool;
///
/// # async fn example() -> oxide_compat_sqlx::Result<()> {
/// let pool = SqlitePool::connect("sqlite::memory:").await?;
/// let executor = SqliteExecutor::new(pool).max_retries(5);
///
/// let query = RawQuery::sql("SELECT id, name FROM users ORDER BY name");
/// let page = executor
///     .fetch_page_as::<(i64, String)>(&query, PageRequest::new(0, 20)?)
///     .await?;
/// println!("{} of {} users", page.rows.len(), page.record_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
    paginator: Paginator,
}

impl SqliteExecutor {
    /// Creates an executor with the default paging retry budget.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            paginator: Paginator::new(Dialect::Sqlite),
        }
    }

    /// Sets how often an unexpectedly empty page is recounted.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.paginator = self.paginator.max_retries(max_retries);
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetches one page of `query` as raw rows.
    pub async fn fetch_page(
        &self,
        query: &RawQuery,
        request: PageRequest,
    ) -> Result<QueryPage<SqliteRow>> {
        self.fetch_page_cancellable(query, request, &Cancellation::new())
            .await
    }

    /// Fetches one page of `query`, stopping early once `cancel` fires.
    pub async fn fetch_page_cancellable(
        &self,
        query: &RawQuery,
        request: PageRequest,
        cancel: &Cancellation,
    ) -> Result<QueryPage<SqliteRow>> {
        self.paginator
            .fetch_page_async(self, query, request, cancel)
            .await
    }

    /// Fetches one page of `query` and decodes each row as `T`.
    pub async fn fetch_page_as<T>(
        &self,
        query: &RawQuery,
        request: PageRequest,
    ) -> Result<QueryPage<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        let page = self.fetch_page(query, request).await?;
        Ok(page.try_map(|row| T::from_row(&row))?)
    }

    /// Executes a statement and returns the number of affected rows.
    pub async fn execute(&self, query: &RawQuery) -> Result<u64> {
        debug!(sql = %query.sql, "Executing statement");
        let result = bind_all(sqlx::query(&query.sql), &query.params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl AsyncQueryExecutor for SqliteExecutor {
    type Row = SqliteRow;
    type Error = CompatSqlxError;

    async fn execute_scalar(&self, sql: &str, params: &[SqlValue]) -> Result<Option<SqlValue>> {
        debug!(sql = %sql, "Executing scalar query");
        let row = bind_all(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(decode_scalar).transpose()?)
    }

    async fn execute_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqliteRow>> {
        debug!(sql = %sql, "Executing query");
        Ok(bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?)
    }
}

impl DialectProvider for SqliteExecutor {
    fn dialect(&self) -> std::result::Result<Dialect, CompatError> {
        dialect_of::<Sqlite>()
    }
}

/// Reads the first column of a row as a [`SqlValue`].
fn decode_scalar(row: &SqliteRow) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(0)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }

    let type_name = raw.type_info().name().to_ascii_uppercase();
    Ok(match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get(0)?),
        "REAL" | "NUMERIC" => SqlValue::Float(row.try_get(0)?),
        "BLOB" => SqlValue::Blob(row.try_get(0)?),
        _ => SqlValue::Text(row.try_get(0)?),
    })
}

/// Binds every parameter of a statement, in order.
pub(crate) fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = bind_param(query, param.clone());
    }
    query
}

/// Binds a SqlValue parameter to a raw query.
fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool")
    }

    #[tokio::test]
    async fn test_execute_scalar_types() {
        let executor = SqliteExecutor::new(create_test_pool().await);

        let scalar = |sql: &'static str| {
            let executor = executor.clone();
            async move { executor.execute_scalar(sql, &[]).await.unwrap() }
        };

        assert_eq!(scalar("SELECT 42").await, Some(SqlValue::Int(42)));
        assert_eq!(scalar("SELECT 1.5").await, Some(SqlValue::Float(1.5)));
        assert_eq!(
            scalar("SELECT 'x'").await,
            Some(SqlValue::Text(String::from("x")))
        );
        assert_eq!(scalar("SELECT NULL").await, Some(SqlValue::Null));
        assert_eq!(scalar("SELECT 1 WHERE 0").await, None);
    }

    #[tokio::test]
    async fn test_execute_binds_parameters() {
        let executor = SqliteExecutor::new(create_test_pool().await);
        let value = executor
            .execute_scalar("SELECT ? + ?", &[SqlValue::Int(2), SqlValue::Int(3)])
            .await
            .unwrap();
        assert_eq!(value, Some(SqlValue::Int(5)));
    }

    #[tokio::test]
    async fn test_dialect_provider() {
        let executor = SqliteExecutor::new(create_test_pool().await);
        assert_eq!(executor.dialect().unwrap(), Dialect::Sqlite);
    }
}
