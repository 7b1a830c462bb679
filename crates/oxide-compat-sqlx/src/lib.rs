//! # oxide-compat-sqlx
//!
//! SQLite backend for [`oxide_compat`] built on sqlx.
//!
//! - [`SqliteExecutor`] runs counted, paginated reads over arbitrary
//!   SELECT statements and returning-style DELETE/UPDATE statements.
//! - [`UniqueViolationTranslator`] turns duplicate-key `sqlx::Error`s into
//!   [`CompatSqlxError::UniqueViolation`] carrying the violated schema,
//!   table and fields.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_compat::{Dialect, EntityDescriptor, RawQuery, SchemaModel};
//! use oxide_compat_sqlx::{SqliteExecutor, UniqueViolationTranslator};
//! use sqlx::SqlitePool;
//!
//! # async fn example() -> oxide_compat_sqlx::Result<()> {
//! let executor = SqliteExecutor::new(SqlitePool::connect("sqlite::memory:").await?);
//! let schema = SchemaModel::new().entity(
//!     EntityDescriptor::new("User", "users")
//!         .column("email", "Email")
//!         .unique_index("ix_users_email", &["email"]),
//! );
//! let translator = UniqueViolationTranslator::new(Dialect::Sqlite, schema);
//!
//! let insert = RawQuery::sql("INSERT INTO users (email) VALUES (?)").bind("a@b.c");
//! let result = executor.execute(&insert).await;
//! if let Err(error) = translator.classify(result, &executor).await {
//!     if let Some(details) = error.unique_violation() {
//!         println!("duplicate {details}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
mod dialect;
mod error;
mod executor;
mod returning;
mod translate;

pub use dialect::dialect_of;
pub use error::{CompatSqlxError, Result};
pub use executor::SqliteExecutor;
pub use oxide_compat::returning::ReturningMode;
pub use translate::UniqueViolationTranslator;
