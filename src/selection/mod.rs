//! The ordered, duplicate-free set of tables chosen for the datasource.

use crate::model::Table;

/// Selected tables, unique by name, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    tables: Vec<Table>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every table not already selected, keeping the given order.
    ///
    /// Already-selected tables (and repeats within `tables`) are skipped.
    /// Returns the number of tables actually added.
    pub fn add<'a, I>(&mut self, tables: I) -> usize
    where
        I: IntoIterator<Item = &'a Table>,
    {
        let mut added = 0;
        for table in tables {
            if !self.contains(&table.name) {
                self.tables.push(table.clone());
                added += 1;
            }
        }
        added
    }

    /// Remove the named tables, returning the ones that were selected.
    pub fn remove<I, S>(&mut self, names: I) -> Vec<Table>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = Vec::new();
        for name in names {
            if let Some(pos) = self.position(name.as_ref()) {
                removed.push(self.tables.remove(pos));
            }
        }
        removed
    }

    /// Keep only tables accepted by `keep`, returning the dropped ones.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<Table>
    where
        F: FnMut(&Table) -> bool,
    {
        let (kept, dropped): (Vec<Table>, Vec<Table>) =
            self.tables.drain(..).partition(|t| keep(t));
        self.tables = kept;
        dropped
    }

    /// Swap a selected table for a fresh definition with the same name.
    pub(crate) fn refresh_definition(&mut self, table: &Table) {
        if let Some(pos) = self.position(&table.name) {
            self.tables[pos] = table.clone();
        }
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name == name)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
