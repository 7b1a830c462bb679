//! Two-tier resolution of parsed violations to [`UniqueConstraintDetails`].
//!
//! Tier one searches the caller's logical schema and reports logical names.
//! Tier two asks the database catalog and reports physical names. When
//! neither tier succeeds the violation is unresolved and the caller should
//! propagate its original error unchanged.

use std::error::Error;

use tracing::{debug, warn};

use super::catalog::{AsyncCatalogQuery, CatalogQuery};
use super::details::UniqueConstraintDetails;
use super::parse::{parse_violation_error, ConstraintViolationRaw};
use super::schema::LogicalSchema;
use crate::dialect::Dialect;

/// Resolves duplicate-key errors of one dialect against a logical schema.
#[derive(Debug, Clone)]
pub struct ConstraintResolver<S> {
    dialect: Dialect,
    schema: S,
}

impl<S: LogicalSchema> ConstraintResolver<S> {
    /// Creates a resolver.
    pub const fn new(dialect: Dialect, schema: S) -> Self {
        Self { dialect, schema }
    }

    /// The dialect whose messages this resolver parses.
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The logical schema used in tier one.
    pub const fn schema(&self) -> &S {
        &self.schema
    }

    /// Resolves against the logical schema only.
    pub fn resolve_logical(&self, raw: &ConstraintViolationRaw) -> Option<UniqueConstraintDetails> {
        match raw {
            ConstraintViolationRaw::Sqlite { table, fields } => {
                let entity = self.schema.find_entity(None, table)?;
                let index = entity.unique_index_over(fields)?;
                debug!(entity = %entity.name, index = %index.name, "Matched unique index by columns");
                UniqueConstraintDetails::new(
                    entity.schema.clone(),
                    &entity.name,
                    entity.logical_columns(fields)?,
                )
            }
            ConstraintViolationRaw::SqlServer {
                schema,
                table,
                index,
            } => {
                let schema = raw.dialect().normalize_schema(Some(schema));
                let entity = self.schema.find_entity(schema.as_deref(), table)?;
                let index = entity.unique_index_named(index)?;
                debug!(entity = %entity.name, index = %index.name, "Matched unique index by name");
                UniqueConstraintDetails::new(
                    entity.schema.clone(),
                    &entity.name,
                    entity.logical_columns(&index.columns)?,
                )
            }
        }
    }

    /// Resolves through the logical schema, then the catalog.
    pub fn resolve<C: CatalogQuery>(
        &self,
        raw: &ConstraintViolationRaw,
        catalog: &C,
    ) -> Option<UniqueConstraintDetails> {
        if let Some(details) = self.resolve_logical(raw) {
            return Some(details);
        }

        match fallback(raw) {
            Fallback::IndexColumns {
                schema,
                table,
                index,
            } => {
                let columns = catalog.unique_index_columns(Some(schema), table, index);
                from_index_columns(raw, columns)
            }
            Fallback::TableOnly { table } => {
                let exists = catalog.table_exists(None, table);
                from_table_lookup(raw, exists)
            }
        }
    }

    /// Resolves through the logical schema, then the catalog, asynchronously.
    pub async fn resolve_async<C: AsyncCatalogQuery>(
        &self,
        raw: &ConstraintViolationRaw,
        catalog: &C,
    ) -> Option<UniqueConstraintDetails> {
        if let Some(details) = self.resolve_logical(raw) {
            return Some(details);
        }

        match fallback(raw) {
            Fallback::IndexColumns {
                schema,
                table,
                index,
            } => {
                let columns = catalog
                    .unique_index_columns(Some(schema), table, index)
                    .await;
                from_index_columns(raw, columns)
            }
            Fallback::TableOnly { table } => {
                let exists = catalog.table_exists(None, table).await;
                from_table_lookup(raw, exists)
            }
        }
    }

    /// Parses the root cause of `error` and resolves it.
    ///
    /// Returns `None` when the error is not a unique violation of this
    /// resolver's dialect or cannot be resolved.
    pub fn resolve_error<C: CatalogQuery>(
        &self,
        error: &(dyn Error + 'static),
        catalog: &C,
    ) -> Option<UniqueConstraintDetails> {
        let raw = parse_violation_error(self.dialect, error)?;
        self.resolve(&raw, catalog)
    }
}

/// The catalog lookup tier two needs for a violation.
enum Fallback<'a> {
    /// SQL Server messages carry no columns.
    IndexColumns {
        schema: &'a str,
        table: &'a str,
        index: &'a str,
    },
    /// SQLite messages already carry the columns; only the table is checked.
    TableOnly { table: &'a str },
}

fn fallback(raw: &ConstraintViolationRaw) -> Fallback<'_> {
    match raw {
        ConstraintViolationRaw::Sqlite { table, .. } => Fallback::TableOnly { table },
        ConstraintViolationRaw::SqlServer {
            schema,
            table,
            index,
        } => Fallback::IndexColumns {
            schema,
            table,
            index,
        },
    }
}

fn from_index_columns<E: std::fmt::Display>(
    raw: &ConstraintViolationRaw,
    columns: Result<Vec<String>, E>,
) -> Option<UniqueConstraintDetails> {
    let ConstraintViolationRaw::SqlServer {
        schema,
        table,
        index,
    } = raw
    else {
        return None;
    };

    match columns {
        Ok(columns) if columns.is_empty() => {
            debug!(%schema, %table, %index, "Unique index not found in catalog");
            None
        }
        Ok(columns) => UniqueConstraintDetails::new(
            raw.dialect().normalize_schema(Some(schema)),
            table.as_str(),
            columns,
        ),
        Err(e) => {
            warn!(%schema, %table, %index, error = %e, "Catalog lookup failed");
            None
        }
    }
}

fn from_table_lookup<E: std::fmt::Display>(
    raw: &ConstraintViolationRaw,
    exists: Result<bool, E>,
) -> Option<UniqueConstraintDetails> {
    let ConstraintViolationRaw::Sqlite { table, fields } = raw else {
        return None;
    };

    match exists {
        Ok(true) => UniqueConstraintDetails::new(None, table.as_str(), fields.clone()),
        Ok(false) => {
            debug!(%table, "Table not found in catalog");
            None
        }
        Err(e) => {
            warn!(%table, error = %e, "Catalog lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::schema::{EntityDescriptor, SchemaModel};
    use std::cell::Cell;

    #[derive(Default)]
    struct StubCatalog {
        columns: Vec<String>,
        table_exists: bool,
        fail: bool,
        calls: Cell<u32>,
    }

    impl CatalogQuery for StubCatalog {
        type Error = String;

        fn unique_index_columns(
            &self,
            _schema: Option<&str>,
            _table: &str,
            _index: &str,
        ) -> Result<Vec<String>, String> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(String::from("connection reset"));
            }
            Ok(self.columns.clone())
        }

        fn table_exists(&self, _schema: Option<&str>, _table: &str) -> Result<bool, String> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(String::from("connection reset"));
            }
            Ok(self.table_exists)
        }
    }

    fn schema() -> SchemaModel {
        SchemaModel::new().entity(
            EntityDescriptor::new("User", "Users")
                .column("EmailAddress", "Email")
                .column("TenantId", "Tenant")
                .unique_index("IX_Users_Email", &["EmailAddress", "TenantId"]),
        )
    }

    fn sqlserver(schema: &str, table: &str, index: &str) -> ConstraintViolationRaw {
        ConstraintViolationRaw::SqlServer {
            schema: schema.to_string(),
            table: table.to_string(),
            index: index.to_string(),
        }
    }

    #[test]
    fn test_logical_tier_uses_logical_names() {
        let resolver = ConstraintResolver::new(Dialect::SqlServer, schema());
        let catalog = StubCatalog::default();
        let details = resolver
            .resolve(&sqlserver("dbo", "Users", "IX_Users_Email"), &catalog)
            .unwrap();
        assert_eq!(details.schema(), None);
        assert_eq!(details.table_name(), "User");
        assert_eq!(details.field_names(), ["Email", "Tenant"]);
        assert_eq!(catalog.calls.get(), 0);
    }

    #[test]
    fn test_catalog_tier_uses_physical_names() {
        let resolver = ConstraintResolver::new(Dialect::SqlServer, SchemaModel::new());
        let catalog = StubCatalog {
            columns: vec![String::from("Number")],
            ..StubCatalog::default()
        };
        let details = resolver
            .resolve(&sqlserver("DBO", "Orders", "UQ_Orders_Number"), &catalog)
            .unwrap();
        assert_eq!(details.schema(), None);
        assert_eq!(details.table_name(), "Orders");
        assert_eq!(details.field_names(), ["Number"]);
    }

    #[test]
    fn test_catalog_tier_keeps_non_default_schema() {
        let resolver = ConstraintResolver::new(Dialect::SqlServer, schema());
        let catalog = StubCatalog {
            columns: vec![String::from("EmailAddress")],
            ..StubCatalog::default()
        };
        let details = resolver
            .resolve(&sqlserver("audit", "Users", "IX_Users_Email"), &catalog)
            .unwrap();
        assert_eq!(details.schema(), Some("audit"));
        assert_eq!(details.table_name(), "Users");
    }

    #[test]
    fn test_unresolved_is_none() {
        let resolver = ConstraintResolver::new(Dialect::SqlServer, SchemaModel::new());
        assert!(resolver
            .resolve(&sqlserver("dbo", "Orders", "IX"), &StubCatalog::default())
            .is_none());

        let failing = StubCatalog {
            fail: true,
            ..StubCatalog::default()
        };
        assert!(resolver
            .resolve(&sqlserver("dbo", "Orders", "IX"), &failing)
            .is_none());
    }

    #[test]
    fn test_sqlite_fallback_checks_table_only() {
        let resolver = ConstraintResolver::new(Dialect::Sqlite, SchemaModel::new());
        let raw = ConstraintViolationRaw::Sqlite {
            table: String::from("orders"),
            fields: vec![String::from("number")],
        };
        let catalog = StubCatalog {
            table_exists: true,
            ..StubCatalog::default()
        };
        let details = resolver.resolve(&raw, &catalog).unwrap();
        assert_eq!(details.table_name(), "orders");
        assert_eq!(details.field_names(), ["number"]);

        assert!(resolver.resolve(&raw, &StubCatalog::default()).is_none());
    }

    #[test]
    fn test_sqlite_logical_requires_matching_index() {
        let resolver = ConstraintResolver::new(Dialect::Sqlite, schema());
        let raw = ConstraintViolationRaw::Sqlite {
            table: String::from("Users"),
            fields: vec![String::from("TenantId"), String::from("EmailAddress")],
        };
        let details = resolver.resolve_logical(&raw).unwrap();
        assert_eq!(details.table_name(), "User");
        assert_eq!(details.field_names(), ["Tenant", "Email"]);

        let partial = ConstraintViolationRaw::Sqlite {
            table: String::from("Users"),
            fields: vec![String::from("EmailAddress")],
        };
        assert!(resolver.resolve_logical(&partial).is_none());
    }
}
