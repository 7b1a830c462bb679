//! Classification of duplicate-key errors.
//!
//! Drivers report unique violations as free text. This module extracts the
//! table and index or columns from that text ([`parse_violation`]) and
//! resolves them to a stable [`UniqueConstraintDetails`] through the
//! caller's logical schema, falling back to the database catalog
//! ([`ConstraintResolver`]).
//!
//! ```rust
//! use oxide_compat::constraint::{parse_violation, ConstraintViolationRaw};
//! use oxide_compat::Dialect;
//!
//! let raw = parse_violation(
//!     Dialect::SqlServer,
//!     "Cannot insert duplicate key row in object 'dbo.Users' with unique index 'IX_Users_Email'.",
//! );
//! assert!(matches!(raw, Some(ConstraintViolationRaw::SqlServer { ref index, .. }) if index == "IX_Users_Email"));
//! ```

pub mod catalog;
mod details;
mod parse;
mod resolve;
mod schema;

pub use catalog::{AsyncCatalogQuery, CatalogQuery};
pub use details::UniqueConstraintDetails;
pub use parse::{innermost_error, parse_violation, parse_violation_error, ConstraintViolationRaw};
pub use resolve::ConstraintResolver;
pub use schema::{EntityDescriptor, LogicalSchema, SchemaModel, UniqueIndexDescriptor};
