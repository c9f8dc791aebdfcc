//! JsonSchemaProvider implementation.
//!
//! Reads a catalog document from the JSON file named by the connection
//! string. The file is re-read on every call, so edits show up on the next
//! refresh.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::provider::{ProviderResult, SchemaProvider};
use super::types::{CatalogDocument, ConnectionInfo, ProviderError, SchemaInfo};
use crate::model::Table;

/// Driver name handled by [`JsonSchemaProvider`].
pub const JSON_DRIVER: &str = "json";

/// SchemaProvider backed by JSON catalog files.
///
/// # Example
///
/// ```ignore
/// let provider = JsonSchemaProvider::new();
/// let conn = ConnectionInfo::new("local", "json", "./catalogs/sales.json");
/// let schemas = provider.list_schemas(&conn).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaProvider;

impl JsonSchemaProvider {
    pub fn new() -> Self {
        Self
    }

    async fn load(&self, connection: &ConnectionInfo) -> ProviderResult<CatalogDocument> {
        if !connection.driver.eq_ignore_ascii_case(JSON_DRIVER) {
            return Err(ProviderError::UnsupportedDriver(connection.driver.clone()));
        }

        let path = Path::new(&connection.connection_string);
        if !path.exists() {
            return Err(ProviderError::ConnectionFailed(format!(
                "catalog file not found: {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let document: CatalogDocument = serde_json::from_str(&content)?;
        debug!(path = %path.display(), schemas = document.schemas.len(), "loaded catalog document");
        Ok(document)
    }
}

#[async_trait]
impl SchemaProvider for JsonSchemaProvider {
    #[instrument(skip(self, connection), fields(connection = %connection.name))]
    async fn list_schemas(&self, connection: &ConnectionInfo) -> ProviderResult<Vec<SchemaInfo>> {
        let document = self.load(connection).await?;
        Ok(document.schema_infos())
    }

    #[instrument(skip(self, connection), fields(connection = %connection.name))]
    async fn list_tables(
        &self,
        connection: &ConnectionInfo,
        schema: &str,
    ) -> ProviderResult<Vec<Table>> {
        let document = self.load(connection).await?;
        document.tables_in(schema)
    }
}
