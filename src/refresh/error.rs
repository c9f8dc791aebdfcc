//! Fetch failures and the structured form handed to the wizard host.

use serde::{Deserialize, Serialize};

use crate::metadata::ProviderError;

/// A failed schema or table fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Listing the schemas of a connection failed.
    #[error("failed to fetch schemas for connection '{connection}'")]
    SchemaFetchFailed {
        connection: String,
        #[source]
        source: ProviderError,
    },

    /// Listing the tables of a schema failed.
    #[error("failed to fetch tables for schema '{schema}'")]
    TableFetchFailed {
        schema: String,
        #[source]
        source: ProviderError,
    },
}

impl FetchError {
    pub fn kind(&self) -> FetchKind {
        match self {
            FetchError::SchemaFetchFailed { .. } => FetchKind::Schemas,
            FetchError::TableFetchFailed { .. } => FetchKind::Tables,
        }
    }

    /// Convert to the message/detail pair shown by the host.
    pub fn to_host_error(&self) -> HostError {
        let detail = match self {
            FetchError::SchemaFetchFailed { source, .. }
            | FetchError::TableFetchFailed { source, .. } => source.to_string(),
        };
        HostError {
            kind: self.kind(),
            message: self.to_string(),
            detail,
        }
    }
}

/// Which fetch a request or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Schemas,
    Tables,
}

/// Failure notification delivered to the wizard host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostError {
    pub kind: FetchKind,
    /// One-line summary for the user.
    pub message: String,
    /// Underlying cause.
    pub detail: String,
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message, self.detail)
    }
}
