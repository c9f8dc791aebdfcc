//! SchemaProvider trait definition.
//!
//! A SchemaProvider discovers the schemas of a connection and the tables of
//! a schema. It is the only I/O the join engine performs, and it is always
//! injected, never looked up.

use async_trait::async_trait;

use super::types::{ConnectionInfo, ProviderError, SchemaInfo};
use crate::model::Table;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for discovering schemas and tables.
///
/// # Example
///
/// ```ignore
/// use multitable::metadata::SchemaProvider;
///
/// async fn example(provider: &impl SchemaProvider, conn: &ConnectionInfo) -> ProviderResult<()> {
///     let schemas = provider.list_schemas(conn).await?;
///     let tables = provider.list_tables(conn, &schemas[0].name).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// List all schemas reachable through the connection.
    async fn list_schemas(&self, connection: &ConnectionInfo) -> ProviderResult<Vec<SchemaInfo>>;

    /// List all tables in a schema.
    ///
    /// If `schema` is empty, lists tables from the default schema.
    async fn list_tables(
        &self,
        connection: &ConnectionInfo,
        schema: &str,
    ) -> ProviderResult<Vec<Table>>;
}
