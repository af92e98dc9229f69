//! # sheetpivot
//!
//! Read Excel (.xlsx) workbooks as rows of named values, and unpivot
//! crosstab sheets into one row per measurement.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sheetpivot::Workbook;
//!
//! let workbook = Workbook::open("people.xlsx")?;
//! for name in workbook.worksheet_names()? {
//!     println!("{name}");
//! }
//!
//! // Rows as (column name, text) pairs, header taken from the first row
//! let sheet = workbook.worksheet("People")?;
//! for row in sheet.rows()? {
//!     println!("{row:?}");
//! }
//! # Ok::<(), sheetpivot::Error>(())
//! ```
//!
//! ## Unpivoting
//!
//! ```no_run
//! use sheetpivot::{PivotReader, Workbook};
//!
//! let workbook = Workbook::open("sales.xlsx")?;
//! let reader = PivotReader::new(&workbook);
//! for table in reader.tables()? {
//!     println!("{} -> {:?}", table.name(), table.column_names()?);
//!     for row in table.rows()? {
//!         println!("{row:?}");
//!     }
//! }
//! # Ok::<(), sheetpivot::Error>(())
//! ```
//!
//! ## Typed rows
//!
//! Implement [`Entity`] to project rows onto a record; see its documentation.

pub mod container;
pub mod error;
pub mod options;
pub mod pivot;
pub mod xlsx;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use error::{Error, Result};
pub use options::ReaderOptions;
pub use pivot::{Dimension, MetaDataTable, Orientation, PivotReader, PivotRow, PivotTable};
pub use xlsx::{CellAddress, Column, ContentType, Entity, KeyedRow, Sheet, SheetEntry, Workbook};

use std::path::Path;

/// Open a workbook file.
///
/// # Example
///
/// ```no_run
/// let workbook = sheetpivot::open_workbook("data.xlsx")?;
/// println!("{:?}", workbook.worksheet_names()?);
/// # Ok::<(), sheetpivot::Error>(())
/// ```
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Workbook> {
    Workbook::open(path)
}

/// Read the rows of one worksheet (the first one when `sheet` is `None`).
///
/// # Example
///
/// ```no_run
/// let rows = sheetpivot::read_rows("data.xlsx", Some("People"))?;
/// println!("{} rows", rows.len());
/// # Ok::<(), sheetpivot::Error>(())
/// ```
pub fn read_rows(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Vec<KeyedRow>> {
    let workbook = Workbook::open(path)?;
    let sheet = workbook.get_worksheet(sheet, true)?;
    let rows = sheet.rows()?.collect();
    Ok(rows)
}

/// Unpivot one table of a workbook (the default table when `table` is
/// `None`).
///
/// # Example
///
/// ```no_run
/// for row in sheetpivot::unpivot("sales.xlsx", None)? {
///     println!("{row:?}");
/// }
/// # Ok::<(), sheetpivot::Error>(())
/// ```
pub fn unpivot(path: impl AsRef<Path>, table: Option<&str>) -> Result<Vec<PivotRow>> {
    let workbook = Workbook::open(path)?;
    let reader = PivotReader::new(&workbook);
    let table = reader.default_table_named(table)?;
    let rows = table.rows()?.collect();
    Ok(rows)
}
