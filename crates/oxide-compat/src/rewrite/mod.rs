//! Query rewriting without a SQL grammar.
//!
//! The clause locator finds the top-level ORDER BY clause and column list
//! of a SELECT statement using keyword patterns over a masked copy of the
//! text. The count and page rewriters are built on top of it. Statements
//! outside the supported shapes fail with
//! [`CompatError::UnrewritableQuery`](crate::CompatError::UnrewritableQuery).

mod locator;
mod paging;
pub(crate) mod scanner;

pub use locator::{split_columns, split_order_by, ColumnSplit, OrderBySplit};
pub(crate) use paging::check_pageable;
pub use paging::{to_count_query, to_paged_query, COUNT_SOURCE_ALIAS};
