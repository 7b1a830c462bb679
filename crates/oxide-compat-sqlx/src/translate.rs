//! Classification of sqlx unique-violation errors.

use oxide_compat::constraint::{parse_violation, AsyncCatalogQuery, LogicalSchema};
use oxide_compat::{ConstraintResolver, Dialect};
use sqlx::error::ErrorKind;
use tracing::debug;

use crate::error::{CompatSqlxError, Result};

/// Turns duplicate-key database errors into
/// [`CompatSqlxError::UniqueViolation`].
///
/// Only errors the driver reports as unique violations are inspected.
/// Anything that cannot be resolved is passed through unchanged.
#[derive(Debug, Clone)]
pub struct UniqueViolationTranslator<S> {
    resolver: ConstraintResolver<S>,
}

impl<S: LogicalSchema> UniqueViolationTranslator<S> {
    /// Creates a translator for `dialect` using `schema` as the logical
    /// metadata.
    pub const fn new(dialect: Dialect, schema: S) -> Self {
        Self {
            resolver: ConstraintResolver::new(dialect, schema),
        }
    }

    /// Returns the underlying resolver.
    pub const fn resolver(&self) -> &ConstraintResolver<S> {
        &self.resolver
    }

    /// Classifies `error`, consulting `catalog` when the logical schema
    /// does not know the constraint.
    pub async fn translate<C: AsyncCatalogQuery>(
        &self,
        error: CompatSqlxError,
        catalog: &C,
    ) -> CompatSqlxError {
        let CompatSqlxError::Database(error) = error else {
            return error;
        };

        let raw = match &error {
            sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::UniqueViolation) => {
                parse_violation(self.resolver.dialect(), db.message())
            }
            _ => None,
        };
        let Some(raw) = raw else {
            return CompatSqlxError::Database(error);
        };

        match self.resolver.resolve_async(&raw, catalog).await {
            Some(details) => {
                debug!(%details, "Classified unique constraint violation");
                CompatSqlxError::UniqueViolation {
                    details,
                    source: error,
                }
            }
            None => {
                debug!(table = %raw.table(), "Unique constraint violation left unresolved");
                CompatSqlxError::Database(error)
            }
        }
    }

    /// Classifies the error of a failed `result`.
    pub async fn classify<T, C: AsyncCatalogQuery>(
        &self,
        result: Result<T>,
        catalog: &C,
    ) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(error) => Err(self.translate(error, catalog).await),
        }
    }
}
