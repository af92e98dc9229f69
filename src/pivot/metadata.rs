//! Pivot annotations: per-table metadata and dimension declarations.

use crate::error::{Error, Result};
use crate::xlsx::{parse_bool, CellAddress, Column, Entity};
use serde::Serialize;

/// Default target server when the metadata names none.
pub const DEFAULT_SQL_SERVER: &str = "(local)";

/// Where a dimension's labels run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    /// Labels in rows above the data block, one label per column
    #[default]
    Horizontal,
    /// Labels in columns left of the data block, one label per row
    Vertical,
}

/// A declared dimension of a pivot table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dimension {
    /// Output column name of the dimension
    pub name: String,
    /// Stripe the labels are read from
    pub orientation: Orientation,
    /// 0-based position among dimensions of the same orientation; rank 0 is
    /// the outermost stripe
    pub rank: usize,
    /// Table tag, required in multi-table workbooks
    pub sheet: Option<String>,
}

impl Dimension {
    /// Whether the table tag names `table`, ignoring case.
    pub fn belongs_to(&self, table: &str) -> bool {
        self.sheet
            .as_deref()
            .is_some_and(|sheet| sheet.to_lowercase() == table.to_lowercase())
    }
}

impl Entity for Dimension {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("Key", |d: &mut Dimension, v| {
                d.name = v.to_string();
                Ok(())
            })
            .case_insensitive(),
            Column::new("Sheet", |d: &mut Dimension, v| {
                d.sheet = Some(v.to_string());
                Ok(())
            }),
        ]
    }
}

/// Assign ranks in document order, per orientation.
pub(crate) fn rank(dimensions: &mut [Dimension]) {
    let mut horizontal = 0;
    let mut vertical = 0;
    for dimension in dimensions {
        let next = match dimension.orientation {
            Orientation::Horizontal => &mut horizontal,
            Orientation::Vertical => &mut vertical,
        };
        dimension.rank = *next;
        *next += 1;
    }
}

/// One row of the metadata marker sheet.
///
/// Every field is optional in the sheet; a table without a row gets
/// `MetaDataTable::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetaDataTable {
    /// Formula pointing at the first measure cell, e.g. `Data!$B$2`
    pub data_origin: Option<String>,
    /// Formula pointing at the top left corner of the label stripes
    pub label_origin: Option<String>,
    /// Explicit table tag
    #[serde(rename = "sheet")]
    pub sheet_tag: Option<String>,
    /// Target database table
    pub table: Option<String>,
    /// Measure column name
    pub measure: Option<String>,
    /// Empty the target table before loading
    pub delete_before_bulk_load: bool,
    /// Target server
    pub sql_server: Option<String>,
    /// Target database
    pub database: Option<String>,
    /// Extra connection options
    pub connection_options: Option<String>,
}

fn parse_origin(text: Option<&str>) -> Result<Option<CellAddress>> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(text) => CellAddress::parse(text)
            .map(Some)
            .map_err(|_| Error::MalformedPivotOrigin(text.to_string())),
    }
}

impl MetaDataTable {
    /// The parsed label origin, `None` when not given.
    pub fn label_origin_address(&self) -> Result<Option<CellAddress>> {
        parse_origin(self.label_origin.as_deref())
    }

    /// The parsed data origin, `None` when not given.
    pub fn data_origin_address(&self) -> Result<Option<CellAddress>> {
        parse_origin(self.data_origin.as_deref())
    }

    /// Whether either origin is given.
    pub fn origin_specified(&self) -> bool {
        self.label_origin.is_some() || self.data_origin.is_some()
    }

    fn origin_sheet(origin: Option<&str>) -> Option<String> {
        parse_origin(origin)
            .ok()
            .flatten()
            .and_then(|a| a.sheet().map(String::from))
    }

    /// The table this row describes: the explicit tag, else the sheet named
    /// by the label origin, else by the data origin.
    pub fn sheet(&self) -> Option<String> {
        self.sheet_tag
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| Self::origin_sheet(self.label_origin.as_deref()))
            .or_else(|| Self::origin_sheet(self.data_origin.as_deref()))
    }

    /// Measure name, falling back to `default`.
    pub fn measure_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.measure.as_deref().filter(|m| !m.is_empty()).unwrap_or(default)
    }

    /// Target server, `(local)` by default.
    pub fn sql_server(&self) -> &str {
        self.sql_server.as_deref().unwrap_or(DEFAULT_SQL_SERVER)
    }

    /// Table names implied by a set of metadata rows, in first-seen order:
    /// label origin sheets, then data origin sheets, then table tags.
    pub fn table_sheets(tables: &[MetaDataTable]) -> Vec<String> {
        let mut names = Vec::new();
        let origins = tables
            .iter()
            .filter_map(|m| m.label_origin.as_deref())
            .chain(tables.iter().filter_map(|m| m.data_origin.as_deref()));
        for origin in origins {
            match parse_origin(Some(origin)) {
                Ok(Some(address)) => names.extend(address.sheet().map(String::from)),
                Ok(None) => {}
                Err(e) => log::warn!("{e}"),
            }
        }
        names.extend(tables.iter().filter_map(MetaDataTable::sheet));
        names
    }
}

impl Entity for MetaDataTable {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("DataOrigin", |m: &mut MetaDataTable, v| {
                m.data_origin = Some(v.to_string());
                Ok(())
            })
            .formula()
            .case_insensitive(),
            Column::new("LabelOrigin", |m: &mut MetaDataTable, v| {
                m.label_origin = Some(v.to_string());
                Ok(())
            })
            .formula()
            .case_insensitive(),
            Column::new("Sheet", |m: &mut MetaDataTable, v| {
                m.sheet_tag = Some(v.to_string());
                Ok(())
            })
            .case_insensitive(),
            Column::new("Table", |m: &mut MetaDataTable, v| {
                m.table = Some(v.to_string());
                Ok(())
            })
            .case_insensitive(),
            Column::new("Measure", |m: &mut MetaDataTable, v| {
                m.measure = Some(v.to_string());
                Ok(())
            })
            .case_insensitive(),
            Column::new("DeleteBeforeBulkLoad", |m: &mut MetaDataTable, v| {
                m.delete_before_bulk_load = parse_bool(v)?;
                Ok(())
            })
            .case_insensitive(),
            Column::new("SqlServer", |m: &mut MetaDataTable, v| {
                m.sql_server = Some(v.to_string());
                Ok(())
            })
            .case_insensitive(),
            Column::new("Database", |m: &mut MetaDataTable, v| {
                m.database = Some(v.to_string());
                Ok(())
            })
            .case_insensitive(),
            Column::new("ConnectionOptions", |m: &mut MetaDataTable, v| {
                m.connection_options = Some(v.to_string());
                Ok(())
            })
            .case_insensitive(),
        ]
    }
}
