//! Commit snapshots and the sink that receives them.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::error::{CommitError, CommitResult};
use crate::model::{JoinRelationship, Table};
use crate::persist::PersistedJoinConfig;
use crate::validation::ModelingMode;

/// Immutable copy of a completed join configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSnapshot {
    /// Datasource name the configuration is committed under.
    pub name: String,
    pub session_id: String,
    /// Hash identifying the connection the tables came from.
    pub context: String,
    pub connection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub mode: ModelingMode,
    pub selected_tables: Vec<Table>,
    pub join_relationships: Vec<JoinRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_table: Option<String>,
}

impl CommitSnapshot {
    /// The name-based form used to restore this configuration later.
    pub fn to_config(&self) -> PersistedJoinConfig {
        PersistedJoinConfig::from(self)
    }
}

impl From<&CommitSnapshot> for PersistedJoinConfig {
    fn from(snapshot: &CommitSnapshot) -> Self {
        PersistedJoinConfig {
            schema: snapshot.schema.clone(),
            tables: snapshot.selected_tables.iter().map(|t| t.name.clone()).collect(),
            relationships: snapshot.join_relationships.clone(),
            fact_table: snapshot.fact_table.clone(),
        }
    }
}

/// Downstream consumer of committed configurations.
pub trait ModelCommitSink: Send + Sync {
    fn commit(&self, snapshot: &CommitSnapshot) -> CommitResult<()>;
}

/// Keeps committed snapshots in memory.
#[derive(Debug, Default)]
pub struct MemoryCommitSink {
    snapshots: Mutex<Vec<CommitSnapshot>>,
    reject_with: Option<String>,
}

impl MemoryCommitSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every commit with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            snapshots: Mutex::default(),
            reject_with: Some(reason.into()),
        }
    }

    pub fn snapshots(&self) -> Vec<CommitSnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<CommitSnapshot> {
        self.snapshots().pop()
    }
}

impl ModelCommitSink for MemoryCommitSink {
    fn commit(&self, snapshot: &CommitSnapshot) -> CommitResult<()> {
        if let Some(reason) = &self.reject_with {
            return Err(CommitError::Rejected(reason.clone()));
        }
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        Ok(())
    }
}
