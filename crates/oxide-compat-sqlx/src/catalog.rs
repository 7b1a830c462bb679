//! Catalog introspection for the constraint resolver's fallback tier.

use oxide_compat::constraint::catalog::{index_columns_query, table_exists_query};
use oxide_compat::constraint::AsyncCatalogQuery;
use oxide_compat::{AsyncQueryExecutor, Dialect};
use sqlx::Row;

use crate::error::{CompatSqlxError, Result};
use crate::executor::SqliteExecutor;

impl AsyncCatalogQuery for SqliteExecutor {
    type Error = CompatSqlxError;

    async fn unique_index_columns(
        &self,
        schema: Option<&str>,
        table: &str,
        index: &str,
    ) -> Result<Vec<String>> {
        let query = index_columns_query(Dialect::Sqlite, schema, table, index);
        let rows = self.execute_rows(&query.sql, &query.params).await?;
        Ok(rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<std::result::Result<_, _>>()?)
    }

    async fn table_exists(&self, schema: Option<&str>, table: &str) -> Result<bool> {
        let query = table_exists_query(Dialect::Sqlite, schema, table);
        let count = self.execute_scalar(&query.sql, &query.params).await?;
        Ok(count.and_then(|value| value.as_i64()).unwrap_or(0) > 0)
    }
}
