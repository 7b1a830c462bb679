//! # oxide-compat
//!
//! Patches the gaps between SQLite and SQL Server that an object mapper
//! runs into, without a full SQL parser:
//!
//! - **Pagination over arbitrary queries**: turn any SELECT into a
//!   `COUNT(*)` query and a page query with the dialect's limit syntax,
//!   then run them with [`Paginator`].
//! - **Duplicate-key classification**: turn the free-text message of a
//!   unique violation into [`UniqueConstraintDetails`] naming the schema,
//!   table and fields, using the caller's logical schema first and the
//!   database catalog second.
//! - **Returning-style mutations**: DELETE/UPDATE statements that yield
//!   the affected rows.
//!
//! The rewriting is pattern based and scoped to the SELECT shapes object
//! mappers generate. Anything else fails with
//! [`CompatError::UnrewritableQuery`] rather than being guessed at.
//!
//! ## Rewriting
//!
//! ```rust
//! use oxide_compat::{Dialect, RawQuery};
//! use oxide_compat::rewrite::{to_count_query, to_paged_query};
//!
//! let query = RawQuery::sql("SELECT id, name FROM users WHERE active = ? ORDER BY name")
//!     .bind(true);
//!
//! let count = to_count_query(&query, Dialect::Sqlite).unwrap();
//! assert_eq!(count.sql, "SELECT COUNT(*) FROM users WHERE active = ?");
//!
//! let page = to_paged_query(&query, Dialect::Sqlite, 2, 20).unwrap();
//! assert!(page.sql.ends_with("ORDER BY name LIMIT ? OFFSET ?"));
//! assert_eq!(page.params.len(), 3);
//! ```
//!
//! ## Unique violations
//!
//! ```rust
//! use oxide_compat::constraint::{parse_violation, ConstraintViolationRaw};
//! use oxide_compat::Dialect;
//!
//! let raw = parse_violation(Dialect::Sqlite, "UNIQUE constraint failed: users.email");
//! assert_eq!(
//!     raw,
//!     Some(ConstraintViolationRaw::Sqlite {
//!         table: "users".into(),
//!         fields: vec!["email".into()],
//!     })
//! );
//! ```

pub mod constraint;
mod dialect;
mod error;
pub mod executor;
pub mod page;
mod query;
pub mod returning;
pub mod rewrite;
mod value;

pub use constraint::{
    ConstraintResolver, EntityDescriptor, LogicalSchema, SchemaModel, UniqueConstraintDetails,
};
pub use dialect::{Dialect, DialectProvider};
pub use error::{CompatError, Result};
pub use executor::{AsyncQueryExecutor, Cancellation, QueryExecutor};
pub use page::{PageRequest, Paginator, QueryPage};
pub use query::RawQuery;
pub use value::{SqlValue, ToSqlValue};
