//! Persistence format for a saved join configuration.
//!
//! A saved configuration refers to everything by name: selected table
//! names, relationship endpoints as table + field names, and the fact table
//! name. Loading resolves those names against a freshly fetched catalog;
//! whatever no longer resolves is dropped.
//!
//! ```json
//! {
//!   "schema": "sales",
//!   "tables": ["orders", "customers"],
//!   "relationships": [
//!     {"left": {"table": "orders", "field": "customer_id"},
//!      "right": {"table": "customers", "field": "id"}}
//!   ],
//!   "fact_table": "orders"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::TableCatalog;
use crate::model::{JoinEndpoint, JoinRelationship, Table};

/// Errors reading or writing a saved configuration.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PersistResult<T> = Result<T, PersistError>;

/// A join configuration saved by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedJoinConfig {
    /// Schema the configuration was built against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Selected table names, in selection order.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Declared relationships, in declaration order.
    #[serde(default)]
    pub relationships: Vec<JoinRelationship>,
    /// Fact table name, if one was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_table: Option<String>,
}

/// A saved configuration resolved against a catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    pub tables: Vec<Table>,
    pub relationships: Vec<JoinRelationship>,
    pub fact_table: Option<String>,
    /// Table names that were not found in the catalog.
    pub dropped_tables: Vec<String>,
    /// Relationships with an endpoint that did not resolve.
    pub dropped_relationships: Vec<JoinRelationship>,
}

impl PersistedJoinConfig {
    pub fn from_json(json: &str) -> PersistResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> PersistResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> PersistResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> PersistResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// True if this configuration belongs to tables fetched from `schema`.
    ///
    /// A configuration without a recorded schema applies to any schema.
    pub fn applies_to(&self, schema: Option<&str>) -> bool {
        match (&self.schema, schema) {
            (None, _) => true,
            (Some(saved), Some(fetched)) => saved == fetched,
            (Some(_), None) => false,
        }
    }

    /// Resolve names against `catalog`, dropping whatever does not resolve.
    pub fn resolve(&self, catalog: &TableCatalog) -> ResolvedConfig {
        let mut resolved = ResolvedConfig::default();

        for name in &self.tables {
            match catalog.get(name) {
                Some(table) if !resolved.tables.iter().any(|t| &t.name == name) => {
                    resolved.tables.push(table.clone());
                }
                Some(_) => {}
                None => resolved.dropped_tables.push(name.clone()),
            }
        }

        let endpoint_resolves = |endpoint: &JoinEndpoint| {
            resolved
                .tables
                .iter()
                .any(|t| t.name == endpoint.table && t.has_field(&endpoint.field))
        };

        let (kept, dropped): (Vec<_>, Vec<_>) = self
            .relationships
            .iter()
            .cloned()
            .partition(|r| endpoint_resolves(&r.left) && endpoint_resolves(&r.right));

        resolved.fact_table = self
            .fact_table
            .clone()
            .filter(|name| resolved.tables.iter().any(|t| &t.name == name));

        resolved.relationships = kept;
        resolved.dropped_relationships = dropped;

        if !resolved.dropped_tables.is_empty() || !resolved.dropped_relationships.is_empty() {
            debug!(
                dropped_tables = ?resolved.dropped_tables,
                dropped_relationships = resolved.dropped_relationships.len(),
                "saved configuration partially resolved"
            );
        }

        resolved
    }
}
