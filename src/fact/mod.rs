//! Star-schema fact table tracking.
//!
//! The domain model holds the fact table as an optional table name that
//! always points into the current selection. The "no selection" placeholder
//! row of a picker, and the index shifting it causes, live only in
//! [`FactTableChoices`].

mod choices;

pub use choices::{FactTableChoice, FactTableChoices, NO_FACT_TABLE_INDEX};

use tracing::debug;

use crate::model::Table;
use crate::selection::SelectionSet;

/// The selected fact table, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactTableResolver {
    current: Option<String>,
}

impl FactTableResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fact table by name.
    ///
    /// A name that is not selected resolves to no fact table.
    pub fn set(&mut self, table: Option<&str>, selection: &SelectionSet) {
        self.current = table.filter(|name| selection.contains(name)).map(str::to_string);
        debug!(fact_table = ?self.current, "fact table set");
    }

    /// Set the fact table from a picker index (see [`FactTableChoices`]).
    pub fn set_by_index(&mut self, index: i32, selection: &SelectionSet) {
        let choices = FactTableChoices::new(selection);
        let name = choices.table_at(index).map(|t| t.name.clone());
        self.set(name.as_deref(), selection);
    }

    /// Clear the fact table if it is no longer selected.
    ///
    /// Returns true if the reference was cleared.
    pub fn revalidate(&mut self, selection: &SelectionSet) -> bool {
        match &self.current {
            Some(name) if !selection.contains(name) => {
                debug!(fact_table = %name, "fact table deselected, clearing");
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The fact table definition from `selection`.
    pub fn table<'a>(&self, selection: &'a SelectionSet) -> Option<&'a Table> {
        self.current.as_deref().and_then(|name| selection.get(name))
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }
}
