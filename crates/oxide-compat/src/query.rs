//! Raw SQL statements with positional parameters.

use std::collections::BTreeSet;

use crate::rewrite::scanner::{mask, Nesting};
use crate::value::{SqlValue, ToSqlValue};

/// A SQL statement and the values bound to its positional placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuery {
    /// The SQL text.
    pub sql: String,
    /// Parameter values in placeholder order.
    pub params: Vec<SqlValue>,
}

impl RawQuery {
    /// Creates a statement with parameters.
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Creates a statement without parameters.
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Appends a parameter value.
    #[must_use]
    pub fn bind<T: ToSqlValue>(mut self, value: T) -> Self {
        self.params.push(value.to_sql_value());
        self
    }

    /// Counts the placeholders in the SQL text, ignoring literals and
    /// comments.
    ///
    /// `?` placeholders are counted one by one; numbered `@Pn` placeholders
    /// are counted once per distinct number. Returns `None` when the text
    /// cannot be scanned.
    #[must_use]
    pub fn placeholder_count(&self) -> Option<usize> {
        let masked = mask(&self.sql, Nesting::Keep).ok()?;
        let positional = masked.iter().filter(|&&b| b == b'?').count();

        let mut numbered = BTreeSet::new();
        let mut i = 0;
        while i + 1 < masked.len() {
            if masked[i] == b'@' && masked[i + 1].eq_ignore_ascii_case(&b'p') {
                let digits = masked[i + 2..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if digits > 0 {
                    numbered.insert(&masked[i + 2..i + 2 + digits]);
                    i += 2 + digits;
                    continue;
                }
            }
            i += 1;
        }

        Some(positional + numbered.len())
    }

    /// Returns whether the placeholder count matches the number of bound
    /// parameters.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.placeholder_count() == Some(self.params.len())
    }
}
