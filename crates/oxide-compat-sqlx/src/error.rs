//! Error types for the sqlx backend.

use oxide_compat::{CompatError, UniqueConstraintDetails};
use thiserror::Error;

/// Errors raised by the sqlx backend.
#[derive(Debug, Error)]
pub enum CompatSqlxError {
    /// Database error from sqlx that was not classified further.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Error from the compatibility layer (rewriting, paging, dialect).
    #[error(transparent)]
    Compat(#[from] CompatError),

    /// A unique constraint was violated and resolved to its fields.
    #[error("unique constraint violated on {details}")]
    UniqueViolation {
        /// The violated constraint.
        details: UniqueConstraintDetails,
        /// The driver error it was classified from.
        #[source]
        source: sqlx::Error,
    },
}

impl CompatSqlxError {
    /// Returns the resolved constraint if this is a classified unique
    /// violation.
    #[must_use]
    pub const fn unique_violation(&self) -> Option<&UniqueConstraintDetails> {
        match self {
            Self::UniqueViolation { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// Result type alias for sqlx backend operations.
pub type Result<T> = std::result::Result<T, CompatSqlxError>;
