// src/join/graph.rs
use std::collections::HashSet;

use tracing::debug;

use super::{JoinError, JoinResult};
use crate::model::{JoinEndpoint, JoinRelationship};
use crate::selection::SelectionSet;

/// Join relationships in declaration order, no duplicate endpoint pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinGraph {
    edges: Vec<JoinRelationship>,
}

impl JoinGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a join between two selected tables.
    ///
    /// Rejected without touching the graph if either endpoint table is not
    /// selected, a field is unknown, both endpoints are on one table, or the
    /// pair is already declared.
    pub fn add_relationship(
        &mut self,
        relationship: JoinRelationship,
        selection: &SelectionSet,
    ) -> JoinResult<()> {
        check_endpoint(&relationship.left, selection)?;
        check_endpoint(&relationship.right, selection)?;

        if relationship.left.table == relationship.right.table {
            return Err(JoinError::SelfJoin(relationship.left.table));
        }

        if self.edges.iter().any(|e| e.same_edge(&relationship)) {
            return Err(JoinError::DuplicateRelationship(relationship));
        }

        debug!(relationship = %relationship, "declared join");
        self.edges.push(relationship);
        Ok(())
    }

    /// Remove a declared relationship (matched in either order).
    pub fn remove_relationship(&mut self, relationship: &JoinRelationship) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| !e.same_edge(relationship));
        before != self.edges.len()
    }

    /// Drop every relationship with an endpoint table outside `selection`.
    ///
    /// Relationships whose two tables are still selected are never touched.
    /// Returns the removed relationships in declaration order.
    pub fn cascade_invalidate(&mut self, selection: &SelectionSet) -> Vec<JoinRelationship> {
        let selected: HashSet<&str> = selection.tables().iter().map(|t| t.name.as_str()).collect();
        self.remove_where(|e| {
            !selected.contains(e.left.table.as_str()) || !selected.contains(e.right.table.as_str())
        })
    }

    /// Like [`cascade_invalidate`](Self::cascade_invalidate), but also drops
    /// relationships whose fields no longer exist on the selected table.
    pub fn cascade_invalidate_fields(&mut self, selection: &SelectionSet) -> Vec<JoinRelationship> {
        self.remove_where(|e| {
            check_endpoint(&e.left, selection).is_err() || check_endpoint(&e.right, selection).is_err()
        })
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    pub fn relationships(&self) -> &[JoinRelationship] {
        &self.edges
    }

    /// Relationships touching `table`.
    pub fn relationships_for<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a JoinRelationship> + 'a {
        self.edges.iter().filter(move |e| e.touches(table))
    }

    pub fn contains(&self, relationship: &JoinRelationship) -> bool {
        self.edges.iter().any(|e| e.same_edge(relationship))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn remove_where<F>(&mut self, mut invalid: F) -> Vec<JoinRelationship>
    where
        F: FnMut(&JoinRelationship) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = self.edges.drain(..).partition(|e| invalid(e));
        self.edges = kept;
        for relationship in &removed {
            debug!(relationship = %relationship, "dropped join with deselected endpoint");
        }
        removed
    }
}

fn check_endpoint(endpoint: &JoinEndpoint, selection: &SelectionSet) -> JoinResult<()> {
    match selection.get(&endpoint.table) {
        None => Err(JoinError::InvalidEndpoint(endpoint.clone())),
        Some(table) if !table.has_field(&endpoint.field) => {
            Err(JoinError::UnknownField(endpoint.clone()))
        }
        Some(_) => Ok(()),
    }
}
