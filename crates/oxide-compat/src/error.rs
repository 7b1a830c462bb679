//! Error types for query rewriting and constraint classification.

use thiserror::Error;

/// Errors raised by the compatibility layer itself.
///
/// Constraint parsing never produces an error: a message that does not
/// describe a unique violation is a normal negative result (`None`).
#[derive(Debug, Error)]
pub enum CompatError {
    /// The connection reported a dialect this crate does not support.
    #[error("unsupported SQL dialect: {0}")]
    UnsupportedDialect(String),

    /// The query does not have a shape the clause locator understands.
    #[error("unable to rewrite query ({reason}): {sql}")]
    UnrewritableQuery {
        /// The SQL that could not be rewritten.
        sql: String,
        /// Which clause could not be located.
        reason: &'static str,
    },

    /// A page size of zero was requested.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// The count query returned something other than a non-negative integer.
    #[error("count query returned a non-integer value: {0}")]
    UnexpectedScalar(String),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl CompatError {
    pub(crate) fn unrewritable(sql: &str, reason: &'static str) -> Self {
        Self::UnrewritableQuery {
            sql: sql.to_string(),
            reason,
        }
    }
}

/// Result type alias for compatibility-layer operations.
pub type Result<T, E = CompatError> = std::result::Result<T, E>;
