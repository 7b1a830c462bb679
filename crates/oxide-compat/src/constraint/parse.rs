//! Extraction of constraint identifiers from duplicate-key messages.

use std::error::Error;
use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;

static SQLITE_UNIQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)unique\s+constraint\s+failed:\s*(.+?)\.?\s*$")
        .expect("Invalid SQLite unique constraint regex")
});

static SQLSERVER_UNIQUE_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)duplicate\s+key\s+row\s+in\s+object\s+'([^']+)'\s+with\s+unique\s+index\s+'([^']+)'")
        .expect("Invalid SQL Server unique index regex")
});

static SQLSERVER_UNIQUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)violation\s+of\s+(?:unique\s+key|primary\s+key)\s+constraint\s+'([^']+)'.*?duplicate\s+key\s+in\s+object\s+'([^']+)'")
        .expect("Invalid SQL Server unique key regex")
});

/// Identifiers taken verbatim from a duplicate-key message.
///
/// Nothing here has been checked against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolationRaw {
    /// SQLite names the table and every column of the violated index.
    Sqlite {
        /// Physical table name.
        table: String,
        /// Physical column names in message order.
        fields: Vec<String>,
    },
    /// SQL Server names the schema, the table and the index only.
    SqlServer {
        /// Physical schema name as reported (usually `dbo`).
        schema: String,
        /// Physical table name.
        table: String,
        /// Name of the unique index or constraint.
        index: String,
    },
}

impl ConstraintViolationRaw {
    /// The dialect that produced the message.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite { .. } => Dialect::Sqlite,
            Self::SqlServer { .. } => Dialect::SqlServer,
        }
    }

    /// The physical table name.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Sqlite { table, .. } | Self::SqlServer { table, .. } => table,
        }
    }
}

/// Parses a duplicate-key message of `dialect`.
///
/// Returns `None` when the message is not a unique violation this crate
/// recognizes. That is a normal outcome, not an error.
#[must_use]
pub fn parse_violation(dialect: Dialect, message: &str) -> Option<ConstraintViolationRaw> {
    match dialect {
        Dialect::Sqlite => parse_sqlite(message),
        Dialect::SqlServer => parse_sqlserver(message),
    }
}

/// Parses the message of the root cause of `error`.
#[must_use]
pub fn parse_violation_error(
    dialect: Dialect,
    error: &(dyn Error + 'static),
) -> Option<ConstraintViolationRaw> {
    parse_violation(dialect, &innermost_error(error).to_string())
}

/// Follows `source()` down to the error that started the chain.
#[must_use]
pub fn innermost_error<'a>(error: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current
}

fn parse_sqlite(message: &str) -> Option<ConstraintViolationRaw> {
    let columns = SQLITE_UNIQUE.captures(message)?.get(1)?.as_str();

    let mut table: Option<String> = None;
    let mut fields = Vec::new();
    for qualified in columns.split(',') {
        let (owner, field) = qualified.trim().rsplit_once('.')?;
        let owner = unquote(owner);
        let field = unquote(field);
        if owner.is_empty() || field.is_empty() {
            return None;
        }
        match &table {
            Some(existing) if !existing.eq_ignore_ascii_case(owner) => return None,
            Some(_) => {}
            None => table = Some(owner.to_string()),
        }
        fields.push(field.to_string());
    }

    Some(ConstraintViolationRaw::Sqlite {
        table: table?,
        fields,
    })
}

fn parse_sqlserver(message: &str) -> Option<ConstraintViolationRaw> {
    let (object, index) = if let Some(caps) = SQLSERVER_UNIQUE_INDEX.captures(message) {
        (caps.get(1)?.as_str(), caps.get(2)?.as_str())
    } else {
        let caps = SQLSERVER_UNIQUE_KEY.captures(message)?;
        (caps.get(2)?.as_str(), caps.get(1)?.as_str())
    };

    let (schema, table) = object.split_once('.')?;
    let (schema, table, index) = (unquote(schema), unquote(table), unquote(index));
    if schema.is_empty() || table.is_empty() || index.is_empty() {
        return None;
    }

    Some(ConstraintViolationRaw::SqlServer {
        schema: schema.to_string(),
        table: table.to_string(),
        index: index.to_string(),
    })
}

/// Strips one layer of identifier quoting.
fn unquote(identifier: &str) -> &str {
    let identifier = identifier.trim();
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if let Some(inner) = identifier
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    identifier
}
