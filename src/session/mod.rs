//! The join configuration session.
//!
//! [`JoinSession`] owns everything one wizard step edits and is the only
//! thing a host talks to. Every mutation ends with a single
//! [`WizardHost::state_changed`] carrying the recomputed
//! [`WizardState`].
//!
//! # Architecture
//!
//! ```text
//!                 ┌───────────────────────────────┐
//!   user edits ──►│          JoinSession          │──► WizardHost
//!                 │                               │     state_changed
//!                 │  TableCatalog   SelectionSet  │     display_error
//!                 │  JoinGraph      FactTable     │     show/hide_busy
//!                 │                               │
//!                 │  SchemaRefreshCoordinator ────┼──► SchemaProvider
//!                 └───────────────┬───────────────┘     (via requests)
//!                                 │ commit(name)
//!                                 ▼
//!                          ModelCommitSink
//! ```
//!
//! # Fetching
//!
//! Fetches are split in two so the session is never borrowed across an
//! await: `request_*` returns a ticket stamped with a generation, the
//! ticket is run anywhere, and its response is handed back to `apply_*`.
//! Responses superseded by a later request are dropped. `fetch_schemas`,
//! `fetch_tables` and `refresh` do all three steps in sequence.

mod error;
mod host;
mod sink;

pub use error::{CommitError, CommitResult, SessionError, SessionResult};
pub use host::{HostEvent, NullHost, RecordingHost, WizardHost};
pub use sink::{CommitSnapshot, MemoryCommitSink, ModelCommitSink};

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::TableCatalog;
use crate::fact::{FactTableChoices, FactTableResolver};
use crate::join::{JoinGraph, JoinResult};
use crate::metadata::{ConnectionInfo, SchemaInfo, SchemaProvider};
use crate::model::{JoinRelationship, Table};
use crate::persist::PersistedJoinConfig;
use crate::refresh::{
    Accepted, RefreshState, SchemaRefreshCoordinator, SchemaRequest, SchemaResponse, TableRequest,
    TableResponse,
};
use crate::selection::SelectionSet;
use crate::store::connection_context;
use crate::validation::{ModelingMode, WizardState};

/// One wizard step configuring the tables and joins of a datasource.
pub struct JoinSession<P: SchemaProvider> {
    id: Uuid,
    coordinator: SchemaRefreshCoordinator<P>,
    catalog: TableCatalog,
    selection: SelectionSet,
    joins: JoinGraph,
    fact_table: FactTableResolver,
    mode: ModelingMode,
    pending_restore: Option<PersistedJoinConfig>,
    activated: bool,
    state: WizardState,
    host: Arc<dyn WizardHost>,
    sink: Arc<dyn ModelCommitSink>,
}

impl<P: SchemaProvider> JoinSession<P> {
    pub fn new(
        provider: Arc<P>,
        connection: ConnectionInfo,
        host: Arc<dyn WizardHost>,
        sink: Arc<dyn ModelCommitSink>,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, connection = %connection.name, "session created");
        Self {
            id,
            coordinator: SchemaRefreshCoordinator::new(provider, connection),
            catalog: TableCatalog::default(),
            selection: SelectionSet::new(),
            joins: JoinGraph::new(),
            fact_table: FactTableResolver::new(),
            mode: ModelingMode::default(),
            pending_restore: None,
            activated: false,
            state: WizardState::BLOCKED,
            host,
            sink,
        }
    }

    pub fn with_mode(mut self, mode: ModelingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restore `config` on the first table fetch it applies to.
    pub fn with_saved_config(mut self, config: PersistedJoinConfig) -> Self {
        self.pending_restore = Some(config);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ModelingMode {
        self.mode
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn joins(&self) -> &JoinGraph {
        &self.joins
    }

    pub fn fact_table(&self) -> Option<&Table> {
        self.fact_table.table(&self.selection)
    }

    pub fn connection(&self) -> &ConnectionInfo {
        self.coordinator.connection()
    }

    pub fn schemas(&self) -> &[SchemaInfo] {
        self.coordinator.schemas()
    }

    pub fn selected_schema(&self) -> Option<&str> {
        self.coordinator.selected_schema()
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.coordinator.state()
    }

    /// The last published state.
    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn has_pending_restore(&self) -> bool {
        self.pending_restore.is_some()
    }

    /// Catalog tables not yet selected, in catalog order.
    pub fn available_tables(&self) -> Vec<&Table> {
        self.catalog
            .tables()
            .iter()
            .filter(|t| !self.selection.contains(&t.name))
            .collect()
    }

    pub fn set_mode(&mut self, mode: ModelingMode) {
        self.mode = mode;
        self.publish();
    }

    /// Select catalog tables by name.
    ///
    /// New tables are appended in catalog order. Names that are already
    /// selected or not in the catalog are skipped.
    pub fn add_tables<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        for name in wanted.iter().filter(|n| !self.catalog.contains(n)) {
            debug!(table = %name, "ignoring table not in catalog");
        }

        let added = self
            .selection
            .add(self.catalog.tables().iter().filter(|t| wanted.contains(&t.name)));
        debug!(added, selected = self.selection.len(), "tables added");
        self.publish();
        added
    }

    /// Deselect tables by name, cascading to joins and the fact table.
    pub fn remove_tables<I, S>(&mut self, names: I) -> Vec<Table>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed = self.selection.remove(names);
        if !removed.is_empty() {
            let dropped = self.joins.cascade_invalidate(&self.selection);
            let fact_cleared = self.fact_table.revalidate(&self.selection);
            debug!(
                removed = removed.len(),
                dropped_joins = dropped.len(),
                fact_cleared,
                "tables removed"
            );
        }
        self.publish();
        removed
    }

    /// Declare a join between two selected tables.
    ///
    /// A rejected relationship leaves the session untouched and publishes
    /// nothing.
    pub fn add_relationship(&mut self, relationship: JoinRelationship) -> JoinResult<()> {
        if let Err(err) = self.joins.add_relationship(relationship, &self.selection) {
            debug!(error = %err, "join rejected");
            return Err(err);
        }
        self.publish();
        Ok(())
    }

    pub fn remove_relationship(&mut self, relationship: &JoinRelationship) -> bool {
        let removed = self.joins.remove_relationship(relationship);
        if removed {
            self.publish();
        }
        removed
    }

    /// Choose the fact table by name; an unselected name clears it.
    pub fn set_fact_table(&mut self, table: Option<&str>) {
        self.fact_table.set(table, &self.selection);
        self.publish();
    }

    /// Choose the fact table from a picker index.
    ///
    /// Index 0 is the "no selection" row; an index past the end clears it.
    pub fn set_fact_table_by_index(&mut self, index: i32) {
        self.fact_table.set_by_index(index, &self.selection);
        self.publish();
    }

    /// Picker rows for the fact table, led by the "no selection" row.
    pub fn fact_table_choices(&self) -> FactTableChoices<'_> {
        FactTableChoices::new(&self.selection)
    }

    /// Picker index of the current fact table.
    pub fn fact_table_index(&self) -> i32 {
        self.fact_table_choices().index_for(self.fact_table.name())
    }

    /// Enter the step moving forward.
    ///
    /// Returns a table fetch if no tables have been loaded yet.
    pub fn activate_forward(&mut self) -> Option<TableRequest<P>> {
        self.activated = true;
        self.publish();
        if self.catalog.is_empty() && !self.coordinator.state().is_fetching() {
            Some(self.request_tables())
        } else {
            None
        }
    }

    /// Re-enter the step from a later one.
    pub fn activate_reverse(&mut self) {
        self.activated = true;
        self.publish();
    }

    /// Switch connections, discarding tables, selection and joins.
    pub fn set_connection(&mut self, connection: ConnectionInfo) {
        let was_fetching_tables = self.coordinator.state() == RefreshState::FetchingTables;
        self.coordinator.set_connection(connection);
        self.catalog = TableCatalog::default();
        self.selection.clear();
        self.joins.clear();
        self.fact_table.clear();
        if self.pending_restore.take().is_some() {
            debug!("discarding saved configuration for previous connection");
        }
        if was_fetching_tables {
            self.host.hide_busy();
        }
        self.publish();
    }

    /// Issue a schema list fetch.
    ///
    /// An outstanding table fetch is superseded and its busy indication
    /// hidden.
    pub fn request_schemas(&mut self) -> SchemaRequest<P> {
        let was_fetching_tables = self.coordinator.state() == RefreshState::FetchingTables;
        let request = self.coordinator.request_schemas();
        if was_fetching_tables {
            self.host.hide_busy();
        }
        self.publish_if_changed();
        request
    }

    /// Apply a schema list response.
    ///
    /// Any current response publishes, since it may leave the error state.
    pub fn apply_schemas(&mut self, response: SchemaResponse) -> Accepted<Vec<SchemaInfo>> {
        match self.coordinator.accept_schemas(response) {
            Accepted::Stale => Accepted::Stale,
            Accepted::Failed(error) => {
                self.host.display_error(&error);
                self.publish();
                Accepted::Failed(error)
            }
            Accepted::Current(schemas) => {
                self.publish();
                Accepted::Current(schemas)
            }
        }
    }

    /// Select a schema.
    ///
    /// While the step is active this issues a table fetch for it; any
    /// outstanding fetch for another schema becomes stale either way.
    pub fn select_schema(&mut self, schema: &str) -> Option<TableRequest<P>> {
        if self.activated {
            return Some(self.request_tables_for(Some(schema)));
        }

        let was_fetching_tables = self.coordinator.state() == RefreshState::FetchingTables;
        self.coordinator.select_schema(schema);
        if was_fetching_tables {
            self.host.hide_busy();
        }
        None
    }

    /// Issue a table fetch for the selected schema.
    pub fn request_tables(&mut self) -> TableRequest<P> {
        self.request_tables_for(None)
    }

    /// Apply a table fetch response.
    ///
    /// A current response replaces the catalog, prunes the selection to
    /// it, restores a pending saved configuration that applies to the
    /// schema, and publishes. A failure is shown to the host and leaves the
    /// catalog and selection untouched.
    pub fn apply_tables(&mut self, response: TableResponse) -> Accepted<Vec<Table>> {
        let schema = Some(response.schema.clone()).filter(|s| !s.is_empty());

        match self.coordinator.accept_tables(response) {
            Accepted::Stale => Accepted::Stale,
            Accepted::Failed(error) => {
                self.host.hide_busy();
                self.host.display_error(&error);
                self.publish();
                Accepted::Failed(error)
            }
            Accepted::Current(tables) => {
                self.host.hide_busy();
                // An unnamed request resolves to the provider's default schema.
                let schema = schema.or_else(|| tables.first().and_then(|t| t.schema.clone()));
                self.replace_catalog(TableCatalog::new(schema, tables.clone()));
                self.restore_pending();
                self.publish();
                Accepted::Current(tables)
            }
        }
    }

    pub async fn fetch_schemas(&mut self) -> Accepted<Vec<SchemaInfo>> {
        let request = self.request_schemas();
        let response = request.run().await;
        self.apply_schemas(response)
    }

    pub async fn fetch_tables(&mut self) -> Accepted<Vec<Table>> {
        let request = self.request_tables();
        let response = request.run().await;
        self.apply_tables(response)
    }

    /// Re-fetch schemas, then the tables of the chosen schema.
    pub async fn refresh(&mut self) -> Accepted<Vec<Table>> {
        match self.fetch_schemas().await {
            Accepted::Current(_) => self.fetch_tables().await,
            Accepted::Stale => Accepted::Stale,
            Accepted::Failed(error) => Accepted::Failed(error),
        }
    }

    /// Hash of the connection the catalog was fetched from.
    pub fn connection_context(&self) -> String {
        connection_context(self.coordinator.connection())
    }

    /// Copy the current configuration for committing under `name`.
    pub fn snapshot(&self, name: &str) -> CommitSnapshot {
        CommitSnapshot {
            name: name.to_string(),
            session_id: self.id.to_string(),
            context: self.connection_context(),
            connection: self.coordinator.connection().name.clone(),
            schema: self.catalog.schema().map(str::to_string),
            mode: self.mode,
            selected_tables: self.selection.tables().to_vec(),
            join_relationships: self.joins.relationships().to_vec(),
            fact_table: self.fact_table.name().map(str::to_string),
        }
    }

    /// Hand the configuration to the commit sink.
    ///
    /// Only allowed while the state is valid or finishable.
    pub fn commit(&self, name: &str) -> SessionResult<CommitSnapshot> {
        let state = self.evaluate();
        if !state.can_complete() {
            return Err(SessionError::NotReady {
                valid: state.valid,
                finishable: state.finishable,
            });
        }

        let snapshot = self.snapshot(name);
        self.sink.commit(&snapshot)?;
        info!(
            datasource = %name,
            tables = snapshot.selected_tables.len(),
            joins = snapshot.join_relationships.len(),
            "join configuration committed"
        );
        Ok(snapshot)
    }

    fn request_tables_for(&mut self, schema: Option<&str>) -> TableRequest<P> {
        let request = self.coordinator.request_tables(schema);
        self.host.show_busy();
        self.publish_if_changed();
        request
    }

    fn replace_catalog(&mut self, catalog: TableCatalog) {
        let dropped = self.selection.retain(|t| catalog.contains(&t.name));
        for table in catalog.tables() {
            self.selection.refresh_definition(table);
        }
        let dropped_joins = self.joins.cascade_invalidate_fields(&self.selection);
        let fact_cleared = self.fact_table.revalidate(&self.selection);

        if !dropped.is_empty() || !dropped_joins.is_empty() || fact_cleared {
            info!(
                dropped_tables = dropped.len(),
                dropped_joins = dropped_joins.len(),
                fact_cleared,
                "selection pruned to new catalog"
            );
        }
        self.catalog = catalog;
    }

    fn restore_pending(&mut self) {
        let schema = self.catalog.schema();
        if !self
            .pending_restore
            .as_ref()
            .is_some_and(|config| config.applies_to(schema))
        {
            return;
        }
        let Some(config) = self.pending_restore.take() else {
            return;
        };

        let resolved = config.resolve(&self.catalog);
        self.selection.clear();
        self.joins.clear();
        self.selection.add(resolved.tables.iter());
        for relationship in resolved.relationships {
            if let Err(err) = self.joins.add_relationship(relationship, &self.selection) {
                debug!(error = %err, "skipping saved join");
            }
        }
        self.fact_table.set(resolved.fact_table.as_deref(), &self.selection);

        info!(
            tables = self.selection.len(),
            joins = self.joins.len(),
            dropped_tables = resolved.dropped_tables.len(),
            "restored saved configuration"
        );
    }

    fn evaluate(&self) -> WizardState {
        if self.coordinator.state() == RefreshState::Error {
            WizardState::BLOCKED
        } else {
            WizardState::of(&self.selection, &self.fact_table, self.mode)
        }
    }

    fn publish(&mut self) {
        self.state = self.evaluate();
        self.host.state_changed(self.state);
    }

    /// Publish only if the gate moved, e.g. a new request left the error state.
    fn publish_if_changed(&mut self) {
        if self.evaluate() != self.state {
            self.publish();
        }
    }
}
