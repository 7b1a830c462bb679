//! Logical schema metadata supplied by the caller.
//!
//! The object mapper knows how entities map to tables and properties map to
//! columns. This module defines the read-only view the resolver needs and a
//! simple in-memory implementation.

/// A unique index declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndexDescriptor {
    /// Physical index name.
    pub name: String,
    /// Physical column names in index order.
    pub columns: Vec<String>,
}

impl UniqueIndexDescriptor {
    /// Creates an index descriptor.
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
        }
    }

    /// Returns whether the index covers exactly `columns`, in any order.
    #[must_use]
    pub fn covers_exactly(&self, columns: &[String]) -> bool {
        self.columns.len() == columns.len()
            && columns
                .iter()
                .all(|c| self.columns.iter().any(|own| own.eq_ignore_ascii_case(c)))
    }
}

/// Mapping metadata for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Logical entity name.
    pub name: String,
    /// Physical schema, `None` for the default schema.
    pub schema: Option<String>,
    /// Physical table name.
    pub table: String,
    /// `(physical column, logical property)` pairs.
    pub columns: Vec<(String, String)>,
    /// Declared unique indexes.
    pub unique_indexes: Vec<UniqueIndexDescriptor>,
}

impl EntityDescriptor {
    /// Creates an entity mapped to `table` in the default schema.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            table: table.into(),
            columns: Vec::new(),
            unique_indexes: Vec::new(),
        }
    }

    /// Sets the physical schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Maps a physical column to a logical property.
    #[must_use]
    pub fn column(mut self, physical: impl Into<String>, logical: impl Into<String>) -> Self {
        self.columns.push((physical.into(), logical.into()));
        self
    }

    /// Declares a unique index over physical columns.
    #[must_use]
    pub fn unique_index(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.unique_indexes
            .push(UniqueIndexDescriptor::new(name, columns));
        self
    }

    /// Returns the logical property mapped to a physical column.
    #[must_use]
    pub fn logical_column(&self, physical: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(physical))
            .map(|(_, logical)| logical.as_str())
    }

    /// Finds a unique index by physical name.
    #[must_use]
    pub fn unique_index_named(&self, name: &str) -> Option<&UniqueIndexDescriptor> {
        self.unique_indexes
            .iter()
            .find(|index| index.name.eq_ignore_ascii_case(name))
    }

    /// Finds the unique index over exactly `columns`.
    #[must_use]
    pub fn unique_index_over(&self, columns: &[String]) -> Option<&UniqueIndexDescriptor> {
        self.unique_indexes
            .iter()
            .find(|index| index.covers_exactly(columns))
    }

    /// Translates physical columns to logical properties, or `None` if any
    /// column is unmapped.
    #[must_use]
    pub fn logical_columns(&self, physical: &[String]) -> Option<Vec<String>> {
        physical
            .iter()
            .map(|column| self.logical_column(column).map(ToString::to_string))
            .collect()
    }
}

/// Read access to the caller's logical schema.
pub trait LogicalSchema {
    /// Finds the entity mapped to a physical table.
    ///
    /// `schema` is already normalized: `None` means the default schema.
    fn find_entity(&self, schema: Option<&str>, table: &str) -> Option<&EntityDescriptor>;
}

impl<S: LogicalSchema + ?Sized> LogicalSchema for &S {
    fn find_entity(&self, schema: Option<&str>, table: &str) -> Option<&EntityDescriptor> {
        (**self).find_entity(schema, table)
    }
}

/// An in-memory [`LogicalSchema`].
///
/// # Example
///
/// ```rust
/// use oxide_compat::{EntityDescriptor, LogicalSchema, SchemaModel};
///
/// let schema = SchemaModel::new().entity(
///     EntityDescriptor::new("User", "users")
///         .column("email_address", "email")
///         .unique_index("ix_users_email", &["email_address"]),
/// );
/// assert_eq!(schema.find_entity(None, "USERS").unwrap().name, "User");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    entities: Vec<EntityDescriptor>,
}

impl SchemaModel {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity.
    #[must_use]
    pub fn entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(entity);
        self
    }

    /// Returns all entities.
    #[must_use]
    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }
}

impl LogicalSchema for SchemaModel {
    fn find_entity(&self, schema: Option<&str>, table: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|entity| {
            entity.table.eq_ignore_ascii_case(table)
                && match (entity.schema.as_deref(), schema) {
                    (None, None) => true,
                    (Some(own), Some(other)) => own.eq_ignore_ascii_case(other),
                    _ => false,
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> EntityDescriptor {
        EntityDescriptor::new("User", "users")
            .column("email_address", "email")
            .column("tenant_id", "tenant")
            .unique_index("ix_users_email_tenant", &["email_address", "tenant_id"])
    }

    #[test]
    fn test_find_entity_matches_schema() {
        let schema = SchemaModel::new()
            .entity(users())
            .entity(EntityDescriptor::new("Archive", "users").schema("archive"));

        assert_eq!(schema.find_entity(None, "users").unwrap().name, "User");
        assert_eq!(
            schema.find_entity(Some("ARCHIVE"), "users").unwrap().name,
            "Archive"
        );
        assert!(schema.find_entity(Some("other"), "users").is_none());
    }

    #[test]
    fn test_unique_index_over_any_order() {
        let entity = users();
        let columns = vec![String::from("TENANT_ID"), String::from("email_address")];
        assert!(entity.unique_index_over(&columns).is_some());
        assert!(entity
            .unique_index_over(&[String::from("email_address")])
            .is_none());
    }

    #[test]
    fn test_logical_columns() {
        let entity = users();
        assert_eq!(
            entity.logical_columns(&[String::from("tenant_id"), String::from("email_address")]),
            Some(vec![String::from("tenant"), String::from("email")])
        );
        assert_eq!(entity.logical_columns(&[String::from("missing")]), None);
    }
}
