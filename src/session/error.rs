//! Session and commit errors.

use crate::store::StoreError;

/// Errors from session operations that can fail.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Commit was attempted while neither gate is open.
    #[error("join configuration is not complete (valid: {valid}, finishable: {finishable})")]
    NotReady { valid: bool, finishable: bool },

    #[error(transparent)]
    Commit(#[from] CommitError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors returned by a [`ModelCommitSink`](super::ModelCommitSink).
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("commit rejected: {0}")]
    Rejected(String),

    #[error("failed to store configuration: {0}")]
    Store(#[from] StoreError),
}

pub type CommitResult<T> = Result<T, CommitError>;
