//! Types exchanged with schema providers.

use std::io;

use serde::{Deserialize, Serialize};

use crate::model::Table;

/// Connection a provider discovers schemas and tables through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Display name of the connection (the key in settings).
    pub name: String,
    /// Driver name, e.g. "json", "postgres".
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
    /// Schema to fall back to when none has been picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
}

impl ConnectionInfo {
    pub fn new(
        name: impl Into<String>,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
            connection_string: connection_string.into(),
            default_schema: None,
        }
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }
}

/// A schema reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl SchemaInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
        }
    }
}

/// A schema together with its tables, as a catalog document stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// Root of a JSON catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub schemas: Vec<SchemaDocument>,
}

/// Errors a schema provider can report.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Failed to read the catalog source.
    #[error("failed to read catalog: {0}")]
    Io(#[from] io::Error),

    /// The catalog source could not be parsed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The requested schema does not exist.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The connection uses a driver this provider does not handle.
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),
}

impl CatalogDocument {
    /// Schemas in document order.
    pub fn schema_infos(&self) -> Vec<SchemaInfo> {
        self.schemas
            .iter()
            .map(|s| SchemaInfo {
                name: s.name.clone(),
                is_default: s.is_default,
            })
            .collect()
    }

    /// Tables of a schema, each tagged with the schema name.
    ///
    /// An empty `schema` picks the schema flagged as default, or the first.
    pub fn tables_in(&self, schema: &str) -> Result<Vec<Table>, ProviderError> {
        let found = if schema.is_empty() {
            self.schemas
                .iter()
                .find(|s| s.is_default)
                .or_else(|| self.schemas.first())
        } else {
            self.schemas.iter().find(|s| s.name == schema)
        };

        let doc = found.ok_or_else(|| ProviderError::SchemaNotFound(schema.to_string()))?;

        Ok(doc
            .tables
            .iter()
            .cloned()
            .map(|mut table| {
                if table.schema.is_none() {
                    table.schema = Some(doc.name.clone());
                }
                table
            })
            .collect())
    }
}
