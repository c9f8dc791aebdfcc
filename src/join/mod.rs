//! Declared join relationships between selected tables.
//!
//! The graph only ever holds relationships whose two endpoint tables are
//! currently selected. Adding checks this up front; removing tables from the
//! selection is followed by [`JoinGraph::cascade_invalidate`].

mod graph;

pub use graph::JoinGraph;

use crate::model::{JoinEndpoint, JoinRelationship};

/// Result type for join graph mutations.
pub type JoinResult<T> = Result<T, JoinError>;

/// Rejections from [`JoinGraph::add_relationship`].
///
/// These are caller errors, not user-facing failures: a correctly
/// constrained UI never produces them, and the graph is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// An endpoint's table is not in the current selection.
    #[error("join endpoint {0} references a table that is not selected")]
    InvalidEndpoint(JoinEndpoint),

    /// The endpoint's table is selected but has no such field.
    #[error("join endpoint {0} references a field the table does not have")]
    UnknownField(JoinEndpoint),

    /// Both endpoints belong to the same table.
    #[error("cannot join table '{0}' to itself")]
    SelfJoin(String),

    /// The same endpoint pair is already declared, in either order.
    #[error("relationship {0} is already declared")]
    DuplicateRelationship(JoinRelationship),
}
