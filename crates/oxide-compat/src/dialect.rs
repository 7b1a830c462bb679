//! SQL dialect support.
//!
//! Only two backends are supported: SQLite (embedded, file based) and
//! SQL Server (client/server). Every piece of dialect-specific behavior in
//! this crate matches on [`Dialect`] exhaustively, so there is no fallback
//! branch that could silently pick the wrong syntax.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};

/// The SQL dialect of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    SqlServer,
}

impl Dialect {
    /// Resolves a dialect from a driver or provider name.
    ///
    /// Matching is case-insensitive. Unknown names are rejected with
    /// [`CompatError::UnsupportedDialect`].
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mssql" | "sqlserver" | "sql server" | "microsoft sql server" | "tds" => {
                Ok(Self::SqlServer)
            }
            _ => Err(CompatError::UnsupportedDialect(name.to_string())),
        }
    }

    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Renders the placeholder for the 1-based parameter `index`.
    ///
    /// SQLite binds `?` positionally. SQL Server placeholders are numbered,
    /// which lets a statement reference its parameters out of order.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Sqlite => String::from("?"),
            Self::SqlServer => format!("@P{index}"),
        }
    }

    /// Returns the schema the server reports when none was specified.
    #[must_use]
    pub const fn default_schema(self) -> Option<&'static str> {
        match self {
            Self::Sqlite => None,
            Self::SqlServer => Some("dbo"),
        }
    }

    /// Maps the default schema (and empty names) to `None`.
    ///
    /// SQL Server always spells out `dbo` in its error messages while
    /// logical metadata treats the default schema as absent.
    #[must_use]
    pub fn normalize_schema(self, schema: Option<&str>) -> Option<String> {
        let schema = schema.map(str::trim).filter(|s| !s.is_empty())?;
        match self.default_schema() {
            Some(default) if schema.eq_ignore_ascii_case(default) => None,
            _ => Some(schema.to_string()),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Reports the dialect of a connection or context.
///
/// Implementations must fail with [`CompatError::UnsupportedDialect`]
/// instead of guessing when the backend is neither SQLite nor SQL Server.
pub trait DialectProvider {
    /// Returns the dialect of the underlying connection.
    fn dialect(&self) -> Result<Dialect>;
}

impl DialectProvider for Dialect {
    fn dialect(&self) -> Result<Dialect> {
        Ok(*self)
    }
}
