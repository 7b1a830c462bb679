//! Clause location for SELECT statements.
//!
//! This is deliberately not a parser. It finds the handful of clauses the
//! rewriter needs with keyword patterns applied to a masked copy of the
//! statement (see [`super::scanner`]), so keywords inside literals,
//! comments, subqueries and window functions are never matched.

use std::sync::LazyLock;

use regex::bytes::Regex;

use super::scanner::{mask, statement_end, Nesting};
use crate::error::{CompatError, Result};

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bORDER\s+BY\b").expect("Invalid ORDER BY regex")
});

static SELECT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*SELECT\b(?:\s+(?:DISTINCT|ALL)\b)?(?:\s+TOP\s*(?:\(\s*\)|\d+)(?:\s+PERCENT\b)?(?:\s+WITH\s+TIES\b)?)?\s*",
    )
    .expect("Invalid SELECT regex")
});

static FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bFROM\b").expect("Invalid FROM regex")
});

/// A statement split at its top-level ORDER BY clause.
///
/// `prefix + order_by + trailer` is the original statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBySplit<'a> {
    /// Everything before the ORDER BY keyword (the whole statement if
    /// there is none).
    pub prefix: &'a str,
    /// From `ORDER BY` to the end of the statement.
    pub order_by: Option<&'a str>,
    /// Trailing whitespace, semicolons and comments.
    pub trailer: &'a str,
}

impl OrderBySplit<'_> {
    /// Returns the statement without its trailer.
    #[must_use]
    pub fn statement(&self) -> String {
        let mut sql = String::from(self.prefix);
        if let Some(order_by) = self.order_by {
            sql.push_str(order_by);
        }
        sql
    }
}

/// A statement split around its top-level column list.
///
/// `select_keyword + column_list + from_onward` is the original statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSplit<'a> {
    /// Leading whitespace, `SELECT` and any `DISTINCT`/`ALL`/`TOP` modifier,
    /// including the whitespace that follows.
    pub select_keyword: &'a str,
    /// The projected expressions, up to the top-level `FROM`.
    pub column_list: &'a str,
    /// `FROM` and everything after it.
    pub from_onward: &'a str,
}

impl<'a> ColumnSplit<'a> {
    /// Returns whether the SELECT keyword carries a modifier that changes
    /// the number of rows (`DISTINCT` or `TOP`).
    #[must_use]
    pub fn has_row_modifier(&self) -> bool {
        self.has_modifier("DISTINCT") || self.has_modifier("TOP")
    }

    /// Returns whether rows are deduplicated by value.
    #[must_use]
    pub fn has_distinct(&self) -> bool {
        self.has_modifier("DISTINCT")
    }

    /// Returns whether a `TOP .. WITH TIES` depends on the ORDER BY.
    #[must_use]
    pub fn has_ties(&self) -> bool {
        self.has_modifier("TIES")
    }

    /// Splits the column list at its top-level commas.
    ///
    /// Each entry is trimmed; commas inside function calls, subqueries and
    /// literals do not split.
    pub fn columns(&self) -> Result<Vec<&'a str>> {
        let masked = mask(self.column_list, Nesting::Blank)?;
        let mut columns = Vec::new();
        let mut start = 0;
        for (i, &b) in masked.iter().enumerate() {
            if b == b',' {
                columns.push(self.column_list[start..i].trim());
                start = i + 1;
            }
        }
        columns.push(self.column_list[start..].trim());
        Ok(columns)
    }

    fn has_modifier(&self, word: &str) -> bool {
        self.select_keyword
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|w| w.eq_ignore_ascii_case(word))
    }
}

/// Splits `sql` at its last top-level ORDER BY.
///
/// The search runs from the end of the statement, so an ORDER BY in a
/// subquery, a window specification or a string literal is never chosen.
pub fn split_order_by(sql: &str) -> Result<OrderBySplit<'_>> {
    let masked = mask(sql, Nesting::Blank)?;
    let end = statement_end(&masked);
    let (statement, trailer) = sql.split_at(end);

    let order_start = ORDER_BY
        .find_iter(&masked[..end])
        .last()
        .map(|m| m.start());

    Ok(match order_start {
        Some(start) => OrderBySplit {
            prefix: &statement[..start],
            order_by: Some(&statement[start..]),
            trailer,
        },
        None => OrderBySplit {
            prefix: statement,
            order_by: None,
            trailer,
        },
    })
}

/// Splits `sql` around its top-level column list.
///
/// Fails with [`CompatError::UnrewritableQuery`] when the statement does not
/// start with `SELECT`, has no top-level `FROM`, or projects nothing.
pub fn split_columns(sql: &str) -> Result<ColumnSplit<'_>> {
    let masked = mask(sql, Nesting::Blank)?;

    let keyword_end = SELECT_KEYWORD
        .find(&masked)
        .map(|m| m.end())
        .ok_or_else(|| CompatError::unrewritable(sql, "statement does not start with SELECT"))?;

    let from_start = FROM
        .find_at(&masked, keyword_end)
        .map(|m| m.start())
        .ok_or_else(|| CompatError::unrewritable(sql, "no top-level FROM clause"))?;

    let column_list = &sql[keyword_end..from_start];
    if column_list.trim().is_empty() {
        return Err(CompatError::unrewritable(sql, "empty column list"));
    }

    Ok(ColumnSplit {
        select_keyword: &sql[..keyword_end],
        column_list,
        from_onward: &sql[from_start..],
    })
}

/// A top-level clause at the end of a SELECT that page syntax collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tail {
    /// `LIMIT`, `OFFSET` or `FETCH`.
    RowLimit,
    /// `OPTION (..)` query hints or a `FOR XML`/`FOR UPDATE` style clause.
    Directive,
}

/// The top-level clauses that decide how many rows a statement returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RowShape {
    /// A top-level `GROUP BY`.
    pub grouped: bool,
    /// A top-level `UNION`, `INTERSECT` or `EXCEPT`.
    pub set_operation: bool,
    /// The strongest trailing clause found, a directive winning over a limit.
    pub tail: Option<Tail>,
}

/// Finds the top-level clauses of `sql` that change its row count or end
/// the statement.
pub(crate) fn row_shape(sql: &str) -> Result<RowShape> {
    static SHAPE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)\b(?:(?P<group>GROUP\s+BY)|(?P<set>UNION|INTERSECT|EXCEPT)|(?P<limit>LIMIT|OFFSET|FETCH)|OPTION|FOR)\b",
        )
        .expect("Invalid clause keyword regex")
    });

    let masked = mask(sql, Nesting::Blank)?;
    let mut shape = RowShape::default();
    for caps in SHAPE_KEYWORD.captures_iter(&masked) {
        if caps.name("group").is_some() {
            shape.grouped = true;
        } else if caps.name("set").is_some() {
            shape.set_operation = true;
        } else if caps.name("limit").is_some() {
            shape.tail = shape.tail.or(Some(Tail::RowLimit));
        } else {
            shape.tail = Some(Tail::Directive);
        }
    }
    Ok(shape)
}
