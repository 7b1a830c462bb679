//! System catalog lookups used when logical metadata does not know a
//! constraint.

use crate::dialect::Dialect;
use crate::query::RawQuery;

const SQLITE_INDEX_COLUMNS: &str = "SELECT ii.name FROM pragma_index_list(?) AS il \
     JOIN pragma_index_info(il.name) AS ii \
     WHERE il.name = ? COLLATE NOCASE AND il.\"unique\" = 1 \
     ORDER BY ii.seqno";

const SQLSERVER_INDEX_COLUMNS: &str = "SELECT c.name FROM sys.indexes AS i \
     INNER JOIN sys.tables AS t ON t.object_id = i.object_id \
     INNER JOIN sys.schemas AS s ON s.schema_id = t.schema_id \
     INNER JOIN sys.index_columns AS ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
     INNER JOIN sys.columns AS c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
     WHERE s.name = @P1 AND t.name = @P2 AND i.name = @P3 \
     AND i.is_unique = 1 AND ic.is_included_column = 0 \
     ORDER BY ic.key_ordinal";

const SQLITE_TABLE_EXISTS: &str = "SELECT COUNT(*) FROM sqlite_master \
     WHERE type = 'table' AND name = ? COLLATE NOCASE";

const SQLSERVER_TABLE_EXISTS: &str = "SELECT COUNT(*) FROM sys.tables AS t \
     INNER JOIN sys.schemas AS s ON s.schema_id = t.schema_id \
     WHERE s.name = @P1 AND t.name = @P2";

/// Builds the query listing the columns of a unique index, in key order.
///
/// The result has one text column. `schema` defaults to the dialect's
/// default schema and is ignored by SQLite.
#[must_use]
pub fn index_columns_query(
    dialect: Dialect,
    schema: Option<&str>,
    table: &str,
    index: &str,
) -> RawQuery {
    match dialect {
        Dialect::Sqlite => RawQuery::sql(SQLITE_INDEX_COLUMNS).bind(table).bind(index),
        Dialect::SqlServer => RawQuery::sql(SQLSERVER_INDEX_COLUMNS)
            .bind(schema_or_default(dialect, schema))
            .bind(table)
            .bind(index),
    }
}

/// Builds the query counting tables named `table` (0 or 1).
#[must_use]
pub fn table_exists_query(dialect: Dialect, schema: Option<&str>, table: &str) -> RawQuery {
    match dialect {
        Dialect::Sqlite => RawQuery::sql(SQLITE_TABLE_EXISTS).bind(table),
        Dialect::SqlServer => RawQuery::sql(SQLSERVER_TABLE_EXISTS)
            .bind(schema_or_default(dialect, schema))
            .bind(table),
    }
}

fn schema_or_default(dialect: Dialect, schema: Option<&str>) -> String {
    schema
        .or_else(|| dialect.default_schema())
        .unwrap_or_default()
        .to_string()
}

/// Blocking access to the database catalog.
pub trait CatalogQuery {
    /// Backend error type.
    type Error: std::fmt::Display;

    /// Returns the physical columns of a unique index in key order, or an
    /// empty list when no such index exists.
    fn unique_index_columns(
        &self,
        schema: Option<&str>,
        table: &str,
        index: &str,
    ) -> Result<Vec<String>, Self::Error>;

    /// Returns whether the table exists.
    fn table_exists(&self, schema: Option<&str>, table: &str) -> Result<bool, Self::Error>;
}

/// Asynchronous access to the database catalog.
#[allow(async_fn_in_trait)]
pub trait AsyncCatalogQuery {
    /// Backend error type.
    type Error: std::fmt::Display;

    /// Returns the physical columns of a unique index in key order, or an
    /// empty list when no such index exists.
    async fn unique_index_columns(
        &self,
        schema: Option<&str>,
        table: &str,
        index: &str,
    ) -> Result<Vec<String>, Self::Error>;

    /// Returns whether the table exists.
    async fn table_exists(&self, schema: Option<&str>, table: &str) -> Result<bool, Self::Error>;
}
