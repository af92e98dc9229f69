//! Cell value resolution.

use super::document::{CellElement, RowElement};
use super::shared_strings::SharedStrings;

/// Resolves cell texts against the workbook's shared string pool.
#[derive(Debug, Clone, Copy)]
pub struct CellContents<'a> {
    strings: &'a SharedStrings,
}

impl<'a> CellContents<'a> {
    /// Create a resolver over a string pool.
    pub fn new(strings: &'a SharedStrings) -> Self {
        Self { strings }
    }

    /// The cell's value text.
    ///
    /// `t="s"` resolves a pool index; every other type (including none) yields
    /// the cached text as-is.
    pub fn value(&self, cell: &CellElement) -> Option<String> {
        let value = cell.value.as_deref()?;
        match cell.cell_type.as_deref() {
            Some("s") => match value.trim().parse::<usize>() {
                Ok(index) => match self.strings.get(index) {
                    Some(s) => Some(s.to_string()),
                    None => {
                        log::warn!(
                            "shared string index {index} out of range ({} strings)",
                            self.strings.len()
                        );
                        None
                    }
                },
                Err(_) => Some(value.to_string()),
            },
            _ => Some(value.to_string()),
        }
    }

    /// The cell's formula text, independent of its value.
    pub fn formula(&self, cell: &CellElement) -> Option<String> {
        cell.formula.clone()
    }

    /// Values of a row by position, with `None` for every skipped column.
    pub fn values(&self, row: &RowElement) -> Vec<Option<String>> {
        self.values_with(row, |cell, _| self.value(cell))
    }

    /// Like [`values`](Self::values), with a custom per-cell getter that also
    /// receives the cell's position.
    pub fn values_with<F>(&self, row: &RowElement, mut pick: F) -> Vec<Option<String>>
    where
        F: FnMut(&CellElement, usize) -> Option<String>,
    {
        let mut values = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let column = cell.column as usize;
            while column > values.len() {
                values.push(None);
            }
            let position = values.len();
            values.push(pick(cell, position));
        }
        values
    }
}
