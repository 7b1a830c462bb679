//! Count and page variants of arbitrary SELECT statements.

use tracing::trace;

use super::locator::{row_shape, split_columns, split_order_by, ColumnSplit, Tail};
use crate::dialect::Dialect;
use crate::error::{CompatError, Result};
use crate::query::RawQuery;
use crate::value::ToSqlValue;

/// Alias of the derived table used when a count cannot be projected in
/// place.
pub const COUNT_SOURCE_ALIAS: &str = "count_source";

const DIRECTIVE: &str = "statement ends in a query hint or FOR clause";

/// Builds a query returning the number of rows `query` returns.
///
/// The ORDER BY clause is dropped and the column list is replaced with
/// `COUNT(*)`. Statements whose row count depends on the projection, on a
/// set operation or on a row limit (`DISTINCT`, `TOP`, `GROUP BY`, `UNION`,
/// `LIMIT`, `OFFSET`, ...) are wrapped in a derived table instead, keeping
/// the ORDER BY when the limit depends on it. Parameters are carried over
/// unchanged.
///
/// SQL Server requires every column of a derived table to have a distinct
/// name. The wrapped projection is either replaced with a constant, when
/// only the number of rows matters, or renamed through a column alias list.
/// A wildcard projection that is deduplicated by value cannot be renamed and
/// fails with [`CompatError::UnrewritableQuery`], as do `OPTION (..)` hints
/// and `FOR` clauses.
pub fn to_count_query(query: &RawQuery, dialect: Dialect) -> Result<RawQuery> {
    let shape = row_shape(&query.sql)?;
    let limited = match shape.tail {
        Some(Tail::Directive) => return Err(CompatError::unrewritable(&query.sql, DIRECTIVE)),
        Some(Tail::RowLimit) => true,
        None => false,
    };

    let ordered = split_order_by(&query.sql)?;
    let statement = ordered.statement();
    let keeps_order = limited || split_columns(&statement)?.has_ties();
    let body = if keeps_order {
        statement.as_str()
    } else {
        ordered.prefix.trim_end()
    };
    let columns = split_columns(body)?;
    let by_value = columns.has_distinct() || shape.set_operation;

    let sql = if limited || by_value || shape.grouped || columns.has_row_modifier() {
        let source = match dialect {
            Dialect::Sqlite => format!("({}) AS {COUNT_SOURCE_ALIAS}", body.trim_start()),
            Dialect::SqlServer => {
                named_count_source(&query.sql, body, &columns, by_value || keeps_order, by_value)?
            }
        };
        format!("SELECT COUNT(*) FROM {source}")
    } else {
        format!("{}COUNT(*) {}", columns.select_keyword, columns.from_onward)
    };

    trace!(original = %query.sql, count = %sql, %dialect, "Rewrote count query");
    Ok(RawQuery::new(sql, query.params.clone()))
}

/// Renders a SQL Server derived table whose columns all have distinct names.
///
/// With `keep_projection` the column list stays and the columns are named
/// `c1..cn` through an alias list; otherwise it becomes the constant `1 AS c`.
/// Wildcards have no known column count, so they fall back to the constant
/// unless `by_value` forbids it.
fn named_count_source(
    sql: &str,
    body: &str,
    columns: &ColumnSplit<'_>,
    keep_projection: bool,
    by_value: bool,
) -> Result<String> {
    let entries = columns.columns()?;
    let wildcard = entries.iter().any(|entry| entry.ends_with('*'));

    if keep_projection && !wildcard {
        let names: Vec<String> = (1..=entries.len()).map(|n| format!("c{n}")).collect();
        return Ok(format!(
            "({}) AS {COUNT_SOURCE_ALIAS} ({})",
            body.trim_start(),
            names.join(", ")
        ));
    }
    if by_value {
        return Err(CompatError::unrewritable(
            sql,
            "wildcard projection cannot be named in a derived table",
        ));
    }
    Ok(format!(
        "({}1 AS c {}) AS {COUNT_SOURCE_ALIAS}",
        columns.select_keyword.trim_start(),
        columns.from_onward
    ))
}

/// Fails when `sql` already ends in a clause that page syntax would
/// duplicate or follow illegally.
pub(crate) fn check_pageable(sql: &str) -> Result<()> {
    match row_shape(sql)?.tail {
        Some(Tail::RowLimit) => Err(CompatError::unrewritable(
            sql,
            "statement already limits its rows",
        )),
        Some(Tail::Directive) => Err(CompatError::unrewritable(sql, DIRECTIVE)),
        None => Ok(()),
    }
}

/// Builds a query returning page `page` (zero based) of `query`.
///
/// Two parameters are appended in `(page_size, offset)` order. Statements
/// that already carry `LIMIT`, `OFFSET`/`FETCH`, `OPTION (..)` or `FOR`
/// fail with [`CompatError::UnrewritableQuery`].
///
/// - SQLite: `LIMIT ? OFFSET ?` is appended to the statement.
/// - SQL Server: `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY` must follow an
///   ORDER BY, so `ORDER BY (SELECT NULL)` is added when the statement has
///   none.
pub fn to_paged_query(
    query: &RawQuery,
    dialect: Dialect,
    page: u64,
    page_size: u64,
) -> Result<RawQuery> {
    if page_size == 0 {
        return Err(CompatError::InvalidPageSize);
    }
    check_pageable(&query.sql)?;

    let ordered = split_order_by(&query.sql)?;
    let size_index = query.params.len() + 1;
    let offset_index = size_index + 1;

    let sql = match dialect {
        Dialect::Sqlite => format!(
            "{} LIMIT {} OFFSET {}",
            ordered.statement(),
            dialect.placeholder(size_index),
            dialect.placeholder(offset_index),
        ),
        Dialect::SqlServer => {
            let fetch = format!(
                "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                dialect.placeholder(offset_index),
                dialect.placeholder(size_index),
            );
            match ordered.order_by {
                Some(order_by) => format!("{}{order_by} {fetch}", ordered.prefix),
                None => format!("{} ORDER BY (SELECT NULL) {fetch}", ordered.prefix),
            }
        }
    };

    let mut params = query.params.clone();
    params.push(page_size.to_sql_value());
    params.push(page.saturating_mul(page_size).to_sql_value());

    trace!(%dialect, page, page_size, sql = %sql, "Rewrote page query");
    Ok(RawQuery::new(sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn test_count_query() {
        let query = RawQuery::sql("SELECT a, b FROM t WHERE c = ? ORDER BY a").bind(3_i64);
        for dialect in [Dialect::Sqlite, Dialect::SqlServer] {
            let count = to_count_query(&query, dialect).unwrap();
            assert_eq!(count.sql, "SELECT COUNT(*) FROM t WHERE c = ?");
            assert_eq!(count.params, vec![SqlValue::Int(3)]);
        }
    }

    #[test]
    fn test_count_query_wraps_distinct() {
        let query = RawQuery::sql("SELECT DISTINCT a FROM t ORDER BY a;");
        assert_eq!(
            to_count_query(&query, Dialect::Sqlite).unwrap().sql,
            "SELECT COUNT(*) FROM (SELECT DISTINCT a FROM t) AS count_source"
        );

        let query = RawQuery::sql("SELECT DISTINCT a + 1, a FROM t");
        assert_eq!(
            to_count_query(&query, Dialect::SqlServer).unwrap().sql,
            "SELECT COUNT(*) FROM (SELECT DISTINCT a + 1, a FROM t) AS count_source (c1, c2)"
        );
    }

    #[test]
    fn test_count_query_wraps_group_by() {
        let query = RawQuery::sql("SELECT a, COUNT(*) FROM t GROUP BY a");
        assert_eq!(
            to_count_query(&query, Dialect::Sqlite).unwrap().sql,
            "SELECT COUNT(*) FROM (SELECT a, COUNT(*) FROM t GROUP BY a) AS count_source"
        );
        assert_eq!(
            to_count_query(&query, Dialect::SqlServer).unwrap().sql,
            "SELECT COUNT(*) FROM (SELECT 1 AS c FROM t GROUP BY a) AS count_source"
        );
    }

    #[test]
    fn test_count_query_wraps_row_limit() {
        let query = RawQuery::sql("SELECT a FROM t ORDER BY a LIMIT 5");
        assert_eq!(
            to_count_query(&query, Dialect::Sqlite).unwrap().sql,
            "SELECT COUNT(*) FROM (SELECT a FROM t ORDER BY a LIMIT 5) AS count_source"
        );

        let query = RawQuery::sql("SELECT a AS x FROM t ORDER BY x OFFSET 2 ROWS");
        assert_eq!(
            to_count_query(&query, Dialect::SqlServer).unwrap().sql,
            "SELECT COUNT(*) FROM (SELECT a AS x FROM t ORDER BY x OFFSET 2 ROWS) AS count_source (c1)"
        );
    }

    #[test]
    fn test_count_query_rejects_distinct_wildcard_on_sqlserver() {
        let query = RawQuery::sql("SELECT DISTINCT * FROM t");
        assert!(to_count_query(&query, Dialect::Sqlite).is_ok());
        assert!(matches!(
            to_count_query(&query, Dialect::SqlServer),
            Err(CompatError::UnrewritableQuery { .. })
        ));
    }

    #[test]
    fn test_count_query_rejects_directives() {
        let query = RawQuery::sql("SELECT a FROM t ORDER BY a OPTION (RECOMPILE)");
        assert!(matches!(
            to_count_query(&query, Dialect::SqlServer),
            Err(CompatError::UnrewritableQuery { .. })
        ));
    }

    #[test]
    fn test_sqlite_page() {
        let query = RawQuery::sql("SELECT a,b FROM T ORDER BY a");
        let paged = to_paged_query(&query, Dialect::Sqlite, 0, 10).unwrap();
        assert_eq!(paged.sql, "SELECT a,b FROM T ORDER BY a LIMIT ? OFFSET ?");
        assert_eq!(paged.params, vec![SqlValue::Int(10), SqlValue::Int(0)]);
    }

    #[test]
    fn test_sqlserver_page_with_order_by() {
        let query = RawQuery::sql("SELECT a FROM t WHERE b = @P1 ORDER BY a").bind("x");
        let paged = to_paged_query(&query, Dialect::SqlServer, 2, 25).unwrap();
        assert_eq!(
            paged.sql,
            "SELECT a FROM t WHERE b = @P1 ORDER BY a OFFSET @P3 ROWS FETCH NEXT @P2 ROWS ONLY"
        );
        assert_eq!(
            paged.params,
            vec![
                SqlValue::Text(String::from("x")),
                SqlValue::Int(25),
                SqlValue::Int(50)
            ]
        );
    }

    #[test]
    fn test_sqlserver_page_without_order_by() {
        let query = RawQuery::sql("SELECT a FROM t");
        let paged = to_paged_query(&query, Dialect::SqlServer, 1, 5).unwrap();
        assert_eq!(
            paged.sql,
            "SELECT a FROM t ORDER BY (SELECT NULL) OFFSET @P2 ROWS FETCH NEXT @P1 ROWS ONLY"
        );
    }

    #[test]
    fn test_page_rejects_existing_tail() {
        for (sql, dialect) in [
            ("SELECT a FROM t LIMIT 5", Dialect::Sqlite),
            ("SELECT a FROM t ORDER BY a OFFSET 5 ROWS", Dialect::SqlServer),
            ("SELECT a FROM t ORDER BY a OPTION (RECOMPILE)", Dialect::SqlServer),
        ] {
            assert!(
                matches!(
                    to_paged_query(&RawQuery::sql(sql), dialect, 0, 10),
                    Err(CompatError::UnrewritableQuery { .. })
                ),
                "{sql}"
            );
        }
    }

    #[test]
    fn test_zero_page_size() {
        let query = RawQuery::sql("SELECT a FROM t");
        assert!(matches!(
            to_paged_query(&query, Dialect::Sqlite, 0, 0),
            Err(CompatError::InvalidPageSize)
        ));
    }
}
