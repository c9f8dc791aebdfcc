//! Schema and table refresh coordination.
//!
//! The coordinator issues schema and table fetches for one connection and
//! decides which responses may be applied.
//!
//! # State machine
//!
//! ```text
//!   Idle ──► FetchingSchemas ──► SchemasReady ──► FetchingTables ──► TablesReady
//!                  │                                    │
//!                  └──────────────► Error ◄─────────────┘
//! ```
//!
//! Every request is stamped with a fresh [`Generation`]. Only a response
//! carrying the latest generation is applied; anything older was superseded
//! by a later request and is dropped as stale. There are no retries and no
//! timeouts here: a failure is reported once and a new request must be
//! issued explicitly.

mod error;
mod request;

pub use error::{FetchError, FetchKind, HostError};
pub use request::{Generation, SchemaRequest, SchemaResponse, TableRequest, TableResponse};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::metadata::{ConnectionInfo, SchemaInfo, SchemaProvider};
use crate::model::Table;

/// Fetch progress for the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    FetchingSchemas,
    SchemasReady,
    FetchingTables,
    TablesReady,
    Error,
}

impl RefreshState {
    pub fn is_fetching(self) -> bool {
        matches!(self, RefreshState::FetchingSchemas | RefreshState::FetchingTables)
    }
}

/// What became of a response handed to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Accepted<T> {
    /// The response was current and succeeded.
    Current(T),
    /// A later request superseded this one; nothing changed.
    Stale,
    /// The response was current and failed; the coordinator is in `Error`.
    Failed(HostError),
}

/// Issues fetches for one connection and filters their responses.
pub struct SchemaRefreshCoordinator<P: SchemaProvider> {
    provider: Arc<P>,
    connection: ConnectionInfo,
    generation: u64,
    state: RefreshState,
    schemas: Vec<SchemaInfo>,
    selected_schema: Option<String>,
    last_error: Option<HostError>,
}

impl<P: SchemaProvider> SchemaRefreshCoordinator<P> {
    pub fn new(provider: Arc<P>, connection: ConnectionInfo) -> Self {
        Self {
            provider,
            connection,
            generation: 0,
            state: RefreshState::Idle,
            schemas: Vec::new(),
            selected_schema: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    pub fn schemas(&self) -> &[SchemaInfo] {
        &self.schemas
    }

    pub fn selected_schema(&self) -> Option<&str> {
        self.selected_schema.as_deref()
    }

    pub fn last_error(&self) -> Option<&HostError> {
        self.last_error.as_ref()
    }

    /// The most recently issued generation.
    pub fn current_generation(&self) -> Generation {
        Generation(self.generation)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    /// Switch to another connection.
    ///
    /// Outstanding requests become stale and known schemas are forgotten.
    pub fn set_connection(&mut self, connection: ConnectionInfo) {
        info!(connection = %connection.name, "switching connection");
        self.generation += 1;
        self.connection = connection;
        self.state = RefreshState::Idle;
        self.schemas.clear();
        self.selected_schema = None;
        self.last_error = None;
    }

    /// Issue a schema list fetch, superseding any outstanding request.
    pub fn request_schemas(&mut self) -> SchemaRequest<P> {
        let generation = self.next_generation();
        self.state = RefreshState::FetchingSchemas;
        SchemaRequest {
            generation,
            provider: Arc::clone(&self.provider),
            connection: self.connection.clone(),
        }
    }

    /// Apply a schema list response.
    ///
    /// On success the selected schema is kept if it still exists, otherwise
    /// the connection's default schema, the provider's default, or the first
    /// schema is picked.
    pub fn accept_schemas(&mut self, response: SchemaResponse) -> Accepted<Vec<SchemaInfo>> {
        if !self.is_current(response.generation) {
            debug!(
                generation = response.generation.0,
                current = self.generation,
                "discarding stale schema response"
            );
            return Accepted::Stale;
        }

        match response.result {
            Ok(schemas) => {
                info!(count = schemas.len(), "schemas fetched");
                self.selected_schema = self.choose_schema(&schemas);
                self.schemas = schemas.clone();
                self.state = RefreshState::SchemasReady;
                self.last_error = None;
                Accepted::Current(schemas)
            }
            Err(source) => {
                let error = FetchError::SchemaFetchFailed {
                    connection: response.connection,
                    source,
                };
                Accepted::Failed(self.fail(error))
            }
        }
    }

    /// Change the selected schema without fetching.
    ///
    /// An outstanding table fetch for the previous schema becomes stale.
    pub fn select_schema(&mut self, schema: &str) {
        self.selected_schema = Some(schema.to_string());
        if self.state == RefreshState::FetchingTables {
            self.generation += 1;
            self.state = if self.schemas.is_empty() {
                RefreshState::Idle
            } else {
                RefreshState::SchemasReady
            };
        }
    }

    /// Issue a table list fetch, superseding any outstanding request.
    ///
    /// `schema` becomes the selected schema; `None` reuses the selected
    /// schema, falling back to the connection's default schema.
    pub fn request_tables(&mut self, schema: Option<&str>) -> TableRequest<P> {
        if let Some(schema) = schema {
            self.selected_schema = Some(schema.to_string());
        } else if self.selected_schema.is_none() {
            self.selected_schema = self.connection.default_schema.clone();
        }

        let generation = self.next_generation();
        self.state = RefreshState::FetchingTables;
        TableRequest {
            generation,
            schema: self.selected_schema.clone().unwrap_or_default(),
            provider: Arc::clone(&self.provider),
            connection: self.connection.clone(),
        }
    }

    /// Apply a table list response.
    pub fn accept_tables(&mut self, response: TableResponse) -> Accepted<Vec<Table>> {
        if !self.is_current(response.generation) {
            debug!(
                generation = response.generation.0,
                current = self.generation,
                schema = %response.schema,
                "discarding stale table response"
            );
            return Accepted::Stale;
        }

        match response.result {
            Ok(tables) => {
                info!(schema = %response.schema, count = tables.len(), "tables fetched");
                self.state = RefreshState::TablesReady;
                self.last_error = None;
                Accepted::Current(tables)
            }
            Err(source) => {
                let error = FetchError::TableFetchFailed {
                    schema: response.schema,
                    source,
                };
                Accepted::Failed(self.fail(error))
            }
        }
    }

    fn next_generation(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    fn fail(&mut self, error: FetchError) -> HostError {
        warn!(error = %error, "fetch failed");
        let host_error = error.to_host_error();
        self.state = RefreshState::Error;
        self.last_error = Some(host_error.clone());
        host_error
    }

    fn choose_schema(&self, schemas: &[SchemaInfo]) -> Option<String> {
        let known = |name: &str| schemas.iter().any(|s| s.name == name);

        if let Some(current) = self.selected_schema.as_deref().filter(|s| known(*s)) {
            return Some(current.to_string());
        }
        if let Some(default) = self.connection.default_schema.as_deref().filter(|s| known(*s)) {
            return Some(default.to_string());
        }
        schemas
            .iter()
            .find(|s| s.is_default)
            .or_else(|| schemas.first())
            .map(|s| s.name.clone())
    }
}
