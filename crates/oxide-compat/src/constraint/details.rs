//! Resolved identity of a violated unique constraint.

use std::fmt;

use serde::Serialize;

/// The schema, table and fields of a violated unique constraint.
///
/// Only the resolver creates these. When logical metadata was found the
/// names are the logical (mapped) ones, otherwise the physical names from
/// the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UniqueConstraintDetails {
    schema: Option<String>,
    table_name: String,
    field_names: Vec<String>,
}

impl UniqueConstraintDetails {
    /// Returns `None` when `field_names` is empty.
    pub(crate) fn new(
        schema: Option<String>,
        table_name: impl Into<String>,
        field_names: Vec<String>,
    ) -> Option<Self> {
        if field_names.is_empty() {
            return None;
        }
        Some(Self {
            schema,
            table_name: table_name.into(),
            field_names,
        })
    }

    /// Schema name, or `None` for the default schema.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Table (or entity) name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Field names in index order. Never empty.
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}

impl fmt::Display for UniqueConstraintDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        write!(f, "{} ({})", self.table_name, self.field_names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_fields() {
        assert!(UniqueConstraintDetails::new(None, "users", Vec::new()).is_none());
    }

    #[test]
    fn test_display() {
        let details = UniqueConstraintDetails::new(
            Some(String::from("sales")),
            "Orders",
            vec![String::from("Number"), String::from("Tenant")],
        )
        .unwrap();
        assert_eq!(details.to_string(), "sales.Orders (Number, Tenant)");
    }
}
