//! # Multitable
//!
//! Join configuration engine for multi-table datasources.
//!
//! ## Architecture
//!
//! A user picks tables from a discovered catalog, declares key-field joins
//! between them and, for star schemas, names a fact table. The engine keeps
//! those pieces consistent and tells the host whether the wizard may
//! advance or finish:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        SchemaProvider (schemas, tables per schema)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [refresh: generation-stamped fetches]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     TableCatalog                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [add / remove tables]
//! ┌─────────────────────────────────────────────────────────┐
//! │   SelectionSet ──► JoinGraph (cascade) ──► FactTable     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │       WizardState { valid, finishable } ──► host         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [commit]
//! ┌─────────────────────────────────────────────────────────┐
//! │          ModelCommitSink (e.g. DatasourceStore)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`session::JoinSession`] ties the pieces together.

pub mod catalog;
pub mod config;
pub mod fact;
pub mod join;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod persist;
pub mod refresh;
pub mod selection;
pub mod session;
pub mod store;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::TableCatalog;
    pub use crate::fact::{FactTableChoice, FactTableChoices, FactTableResolver, NO_FACT_TABLE_INDEX};
    pub use crate::join::{JoinError, JoinGraph};
    pub use crate::metadata::{
        ConnectionInfo, JsonSchemaProvider, ProviderError, SchemaInfo, SchemaProvider,
        StaticSchemaProvider,
    };
    pub use crate::model::{Field, JoinEndpoint, JoinRelationship, Table};
    pub use crate::persist::PersistedJoinConfig;
    pub use crate::refresh::{Accepted, HostError, RefreshState};
    pub use crate::selection::SelectionSet;
    pub use crate::session::{
        CommitSnapshot, JoinSession, MemoryCommitSink, ModelCommitSink, RecordingHost, WizardHost,
    };
    pub use crate::store::{DatasourceOrigin, DatasourceStore};
    pub use crate::validation::{ModelingMode, WizardState};
}
