//! Reserved marker sheet names.

use crate::xlsx::{Column, Entity};

/// The reserved sheet names for one marker prefix.
///
/// Matching ignores case. Besides the fixed markers, any other sheet whose
/// name starts with the prefix declares table names in a `Sheet` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNaming {
    prefix: String,
}

impl SheetNaming {
    /// Markers for a prefix such as `_pivot`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_lowercase(),
        }
    }

    /// The marker prefix, lowercased.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Per-table metadata sheet (`_pivotsheets`).
    pub fn metadata_sheet(&self) -> String {
        format!("{}sheets", self.prefix)
    }

    /// Horizontal dimension declarations (`_pivothorizontal`).
    pub fn horizontal_sheet(&self) -> String {
        format!("{}horizontal", self.prefix)
    }

    /// Vertical dimension declarations (`_pivotvertical`).
    pub fn vertical_sheet(&self) -> String {
        format!("{}vertical", self.prefix)
    }

    fn data_prefix(&self) -> String {
        format!("{}data", self.prefix)
    }

    /// Whether a sheet name starts with the marker prefix.
    pub fn is_reserved(&self, name: &str) -> bool {
        name.to_lowercase().starts_with(&self.prefix)
    }

    /// Whether a sheet declares table names: reserved, but neither the
    /// metadata sheet nor a `data` sheet.
    pub fn is_naming_sheet(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        name.starts_with(&self.prefix)
            && name != self.metadata_sheet()
            && !name.starts_with(&self.data_prefix())
    }
}

/// One row of a table-name declaration sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TableNameRow {
    pub(crate) name: Option<String>,
}

impl Entity for TableNameRow {
    fn columns() -> Vec<Column<Self>> {
        vec![Column::new("Sheet", |row: &mut TableNameRow, v| {
            row.name = Some(v.to_string());
            Ok(())
        })]
    }
}
