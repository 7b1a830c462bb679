//! DELETE and UPDATE statements that also return the affected rows.
//!
//! SQL Server uses an `OUTPUT` clause and SQLite (3.35+) a `RETURNING`
//! clause. Older SQLite builds have neither, so a delete can instead be
//! planned as a SELECT followed by the DELETE. Executors must run both
//! statements of an emulated plan in one transaction and commit only after
//! both succeeded.

use crate::dialect::Dialect;
use crate::query::RawQuery;
use crate::value::SqlValue;

/// How to obtain the affected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturningMode {
    /// Use the dialect's `OUTPUT`/`RETURNING` clause.
    #[default]
    Native,
    /// Select the rows first, then mutate, inside one transaction.
    Emulated,
}

/// The statements implementing a returning-style mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturningPlan {
    /// A single statement that mutates and yields the affected rows.
    Native(RawQuery),
    /// A read of the affected rows followed by the mutation.
    Emulated {
        /// Returns the rows about to be affected.
        select: RawQuery,
        /// Performs the mutation.
        mutate: RawQuery,
    },
}

/// Plans a DELETE on `table` returning the deleted rows.
///
/// `predicate` is a WHERE condition (without the keyword) with its own
/// parameters. `table` is inserted verbatim and must already be quoted if
/// needed.
#[must_use]
pub fn plan_delete(
    dialect: Dialect,
    table: &str,
    predicate: Option<&RawQuery>,
    mode: ReturningMode,
) -> ReturningPlan {
    let (condition, params) = where_clause(predicate);

    match mode {
        ReturningMode::Native => {
            let sql = match dialect {
                Dialect::Sqlite => format!("DELETE FROM {table}{condition} RETURNING *"),
                Dialect::SqlServer => format!("DELETE FROM {table} OUTPUT DELETED.*{condition}"),
            };
            ReturningPlan::Native(RawQuery::new(sql, params))
        }
        ReturningMode::Emulated => ReturningPlan::Emulated {
            select: RawQuery::new(format!("SELECT * FROM {table}{condition}"), params.clone()),
            mutate: RawQuery::new(format!("DELETE FROM {table}{condition}"), params),
        },
    }
}

/// Plans an UPDATE on `table` returning the updated rows.
///
/// `assignments` is the SET list (without the keyword). Its parameters come
/// before the predicate's, matching their order in the statement.
#[must_use]
pub fn plan_update(
    dialect: Dialect,
    table: &str,
    assignments: &RawQuery,
    predicate: Option<&RawQuery>,
) -> RawQuery {
    let (condition, predicate_params) = where_clause(predicate);
    let sql = match dialect {
        Dialect::Sqlite => {
            format!("UPDATE {table} SET {}{condition} RETURNING *", assignments.sql)
        }
        Dialect::SqlServer => format!(
            "UPDATE {table} SET {} OUTPUT INSERTED.*{condition}",
            assignments.sql
        ),
    };

    let mut params = assignments.params.clone();
    params.extend(predicate_params);
    RawQuery::new(sql, params)
}

fn where_clause(predicate: Option<&RawQuery>) -> (String, Vec<SqlValue>) {
    match predicate {
        Some(p) if !p.sql.trim().is_empty() => {
            (format!(" WHERE {}", p.sql.trim()), p.params.clone())
        }
        _ => (String::new(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_delete() {
        let predicate = RawQuery::sql("tenant = ?").bind(4_i64);
        assert_eq!(
            plan_delete(Dialect::Sqlite, "users", Some(&predicate), ReturningMode::Native),
            ReturningPlan::Native(RawQuery::new(
                "DELETE FROM users WHERE tenant = ? RETURNING *",
                vec![SqlValue::Int(4)]
            ))
        );

        let predicate = RawQuery::sql("tenant = @P1").bind(4_i64);
        assert_eq!(
            plan_delete(Dialect::SqlServer, "dbo.Users", Some(&predicate), ReturningMode::Native),
            ReturningPlan::Native(RawQuery::new(
                "DELETE FROM dbo.Users OUTPUT DELETED.* WHERE tenant = @P1",
                vec![SqlValue::Int(4)]
            ))
        );
    }

    #[test]
    fn test_emulated_delete() {
        let plan = plan_delete(Dialect::Sqlite, "users", None, ReturningMode::Emulated);
        assert_eq!(
            plan,
            ReturningPlan::Emulated {
                select: RawQuery::sql("SELECT * FROM users"),
                mutate: RawQuery::sql("DELETE FROM users"),
            }
        );
    }

    #[test]
    fn test_update_parameter_order() {
        let assignments = RawQuery::sql("name = @P1").bind("x");
        let predicate = RawQuery::sql("id = @P2").bind(9_i64);
        let query = plan_update(Dialect::SqlServer, "Users", &assignments, Some(&predicate));
        assert_eq!(
            query.sql,
            "UPDATE Users SET name = @P1 OUTPUT INSERTED.* WHERE id = @P2"
        );
        assert_eq!(
            query.params,
            vec![SqlValue::Text(String::from("x")), SqlValue::Int(9)]
        );
    }
}
