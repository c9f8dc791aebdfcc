//! Table catalog for one connection/schema scope.
//!
//! A catalog is produced by a single successful table fetch and is replaced
//! wholesale by the next one. It is never merged.

use crate::model::Table;

/// Tables discoverable in one schema, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCatalog {
    schema: Option<String>,
    tables: Vec<Table>,
}

impl TableCatalog {
    /// Build a catalog from a fetch result.
    ///
    /// Later duplicates of a table name are ignored so that names stay
    /// unique within the catalog.
    pub fn new(schema: Option<String>, tables: Vec<Table>) -> Self {
        let mut unique: Vec<Table> = Vec::with_capacity(tables.len());
        for table in tables {
            if unique.iter().all(|t| t.name != table.name) {
                unique.push(table);
            }
        }
        Self {
            schema,
            tables: unique,
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Position of a table in discovery order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name == name)
    }
}
