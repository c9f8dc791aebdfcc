//! Fetch requests and their responses.
//!
//! A request is created synchronously by the coordinator and stamped with
//! the generation current at that moment. Running it only needs the
//! provider and the connection it carries, so the session stays free for
//! user edits while the fetch is in flight. The response carries the
//! generation back so the coordinator can drop it if it was superseded.

use std::sync::Arc;

use tracing::debug;

use crate::metadata::{ConnectionInfo, ProviderResult, SchemaInfo, SchemaProvider};
use crate::model::Table;

/// Token identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub(crate) u64);

/// An issued, not yet executed, schema list fetch.
pub struct SchemaRequest<P: SchemaProvider> {
    pub(crate) generation: Generation,
    pub(crate) provider: Arc<P>,
    pub(crate) connection: ConnectionInfo,
}

impl<P: SchemaProvider> SchemaRequest<P> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Execute the fetch.
    pub async fn run(self) -> SchemaResponse {
        debug!(generation = self.generation.0, "fetching schemas");
        let result = self.provider.list_schemas(&self.connection).await;
        SchemaResponse {
            generation: self.generation,
            connection: self.connection.name,
            result,
        }
    }
}

/// Outcome of a schema list fetch.
#[derive(Debug)]
pub struct SchemaResponse {
    pub generation: Generation,
    pub connection: String,
    pub result: ProviderResult<Vec<SchemaInfo>>,
}

/// An issued, not yet executed, table list fetch.
pub struct TableRequest<P: SchemaProvider> {
    pub(crate) generation: Generation,
    pub(crate) schema: String,
    pub(crate) provider: Arc<P>,
    pub(crate) connection: ConnectionInfo,
}

impl<P: SchemaProvider> TableRequest<P> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Execute the fetch.
    pub async fn run(self) -> TableResponse {
        debug!(generation = self.generation.0, schema = %self.schema, "fetching tables");
        let result = self.provider.list_tables(&self.connection, &self.schema).await;
        TableResponse {
            generation: self.generation,
            schema: self.schema,
            result,
        }
    }
}

/// Outcome of a table list fetch.
#[derive(Debug)]
pub struct TableResponse {
    pub generation: Generation,
    pub schema: String,
    pub result: ProviderResult<Vec<Table>>,
}
