//! XLSX (Excel) workbook reader.
//!
//! This module reads Office Open XML spreadsheets as rows of
//! (column name, text) pairs, with an optional typed projection onto
//! caller-declared records.
//!
//! # Example
//!
//! ```no_run
//! use sheetpivot::xlsx::Workbook;
//!
//! let workbook = Workbook::open("spreadsheet.xlsx")?;
//! let sheet = workbook.first_sheet()?;
//! println!("Sheet: {}", sheet.name());
//! for row in sheet.rows()? {
//!     println!("{row:?}");
//! }
//! # Ok::<(), sheetpivot::Error>(())
//! ```

pub mod address;
mod catalog;
mod cell;
mod document;
mod projection;
mod shared_strings;
mod sheet;
mod workbook;

pub use address::{column_index, column_name, default_header, CellAddress};
pub use catalog::{SheetCatalog, SheetEntry};
pub use cell::CellContents;
pub use document::{CellElement, RowElement, WorksheetDocument};
pub use projection::{parse_bool, parse_field, Assign, Column, ColumnMap, ContentType, Entity};
pub use shared_strings::SharedStrings;
pub use sheet::{KeyedRow, Sheet};
pub use workbook::Workbook;

use crate::error::Result;
use std::cell::OnceCell;

/// Fill a memo cell from a fallible computation, at most once on success.
pub(crate) fn get_or_try_init<T>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}
