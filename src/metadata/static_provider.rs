//! In-memory SchemaProvider.
//!
//! Serves a fixed catalog document. Failures can be injected per call kind,
//! which makes it the provider of choice for tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::provider::{ProviderResult, SchemaProvider};
use super::types::{CatalogDocument, ConnectionInfo, ProviderError, SchemaDocument, SchemaInfo};
use crate::model::Table;

/// SchemaProvider over an in-memory catalog document.
///
/// # Example
///
/// ```ignore
/// let provider = StaticSchemaProvider::new()
///     .with_schema("sales", vec![Table::new("orders"), Table::new("customers")])
///     .failing_tables("archive", "permission denied");
/// ```
#[derive(Debug, Default)]
pub struct StaticSchemaProvider {
    document: CatalogDocument,
    schema_failure: Option<String>,
    table_failures: HashMap<String, String>,
    schema_calls: AtomicUsize,
    table_calls: AtomicUsize,
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: CatalogDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Add a schema with its tables.
    pub fn with_schema(mut self, name: impl Into<String>, tables: Vec<Table>) -> Self {
        self.document.schemas.push(SchemaDocument {
            name: name.into(),
            is_default: false,
            tables,
        });
        self
    }

    /// Make `list_schemas` fail with a connection error.
    pub fn failing_schemas(mut self, message: impl Into<String>) -> Self {
        self.schema_failure = Some(message.into());
        self
    }

    /// Make `list_tables` fail for one schema with a connection error.
    pub fn failing_tables(mut self, schema: impl Into<String>, message: impl Into<String>) -> Self {
        self.table_failures.insert(schema.into(), message.into());
        self
    }

    /// Number of `list_schemas` calls served so far.
    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_tables` calls served so far.
    pub fn table_calls(&self) -> usize {
        self.table_calls.load(Ordering::SeqCst)
    }

    pub fn document(&self) -> &CatalogDocument {
        &self.document
    }
}

#[async_trait]
impl SchemaProvider for StaticSchemaProvider {
    async fn list_schemas(&self, _connection: &ConnectionInfo) -> ProviderResult<Vec<SchemaInfo>> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.schema_failure {
            return Err(ProviderError::ConnectionFailed(message.clone()));
        }
        Ok(self.document.schema_infos())
    }

    async fn list_tables(
        &self,
        _connection: &ConnectionInfo,
        schema: &str,
    ) -> ProviderResult<Vec<Table>> {
        self.table_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.table_failures.get(schema) {
            return Err(ProviderError::ConnectionFailed(message.clone()));
        }
        self.document.tables_in(schema)
    }
}
