//! Dialect detection for sqlx databases.

use oxide_compat::{CompatError, Dialect};

/// Maps a sqlx database to its dialect by the driver name.
///
/// Drivers other than SQLite and SQL Server are rejected with
/// [`CompatError::UnsupportedDialect`].
pub fn dialect_of<DB: sqlx::Database>() -> Result<Dialect, CompatError> {
    Dialect::from_name(DB::NAME)
}
