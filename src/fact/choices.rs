//! Picker view of the fact table options.

use crate::model::Table;
use crate::selection::SelectionSet;

/// Picker index of the "no fact table" placeholder row.
pub const NO_FACT_TABLE_INDEX: i32 = 0;

/// One row of the fact table picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactTableChoice<'a> {
    None,
    Table(&'a Table),
}

/// Rows of a fact table picker: a placeholder at index 0, then the
/// selected tables in selection order, so table `i` sits at index `i + 1`.
#[derive(Debug, Clone)]
pub struct FactTableChoices<'a> {
    selection: &'a SelectionSet,
}

impl<'a> FactTableChoices<'a> {
    pub fn new(selection: &'a SelectionSet) -> Self {
        Self { selection }
    }

    /// Number of rows, including the placeholder.
    pub fn len(&self) -> usize {
        self.selection.len() + 1
    }

    /// Always false: the placeholder row is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The table at a picker index.
    ///
    /// The placeholder, negative indices and indices past the end all
    /// resolve to no table.
    pub fn table_at(&self, index: i32) -> Option<&'a Table> {
        if index <= NO_FACT_TABLE_INDEX {
            return None;
        }
        self.selection.tables().get(index as usize - 1)
    }

    /// Picker index of a selected table, or `None` if it is not selected.
    pub fn index_of(&self, table: &str) -> Option<i32> {
        self.selection.position(table).map(|pos| pos as i32 + 1)
    }

    /// Picker index to show for the current fact table.
    pub fn index_for(&self, fact_table: Option<&str>) -> i32 {
        fact_table
            .and_then(|name| self.index_of(name))
            .unwrap_or(NO_FACT_TABLE_INDEX)
    }

    pub fn iter(&self) -> impl Iterator<Item = FactTableChoice<'a>> + 'a {
        std::iter::once(FactTableChoice::None)
            .chain(self.selection.tables().iter().map(FactTableChoice::Table))
    }
}
