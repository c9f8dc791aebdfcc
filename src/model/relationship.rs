//! Join relationships between key fields of two tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One side of a join: a field of a table, both by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinEndpoint {
    pub table: String,
    pub field: String,
}

impl JoinEndpoint {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for JoinEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// A declared join between two endpoints.
///
/// `left` and `right` only record declaration order. Two relationships
/// over the same pair of endpoints are the same edge regardless of order,
/// see [`JoinRelationship::same_edge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRelationship {
    pub left: JoinEndpoint,
    pub right: JoinEndpoint,
}

impl JoinRelationship {
    pub fn new(left: JoinEndpoint, right: JoinEndpoint) -> Self {
        Self { left, right }
    }

    /// Shorthand for `left_table.left_field = right_table.right_field`.
    pub fn between(
        left_table: impl Into<String>,
        left_field: impl Into<String>,
        right_table: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self::new(
            JoinEndpoint::new(left_table, left_field),
            JoinEndpoint::new(right_table, right_field),
        )
    }

    /// True if `other` joins the same two endpoints, in either order.
    pub fn same_edge(&self, other: &JoinRelationship) -> bool {
        self.edge_key() == other.edge_key()
    }

    /// True if either endpoint belongs to `table`.
    pub fn touches(&self, table: &str) -> bool {
        self.left.table == table || self.right.table == table
    }

    /// Order-independent key for the endpoint pair.
    pub fn edge_key(&self) -> (&JoinEndpoint, &JoinEndpoint) {
        if self.left <= self.right {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        }
    }
}

impl fmt::Display for JoinRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}
