//! Pivot tables: crosstab regions annotated by reserved marker sheets.
//!
//! A workbook describes its pivot tables in sheets whose names start with a
//! reserved prefix (`_pivot` by default):
//!
//! - `_pivotsheets`: one metadata row per table (`LabelOrigin`, `DataOrigin`,
//!   `Measure`, `Table`, `Sheet`, ...)
//! - `_pivothorizontal` / `_pivotvertical`: dimension declarations (`Key`,
//!   `Sheet`), outermost first
//! - any other `_pivot*` sheet except `_pivotdata*`: table names (`Sheet`)
//!
//! [`PivotReader`] reads these annotations and [`PivotTable::rows`] turns a
//! table into one row per measure cell.

mod metadata;
mod naming;
mod reader;
mod table;
mod unpivot;

pub use metadata::{Dimension, MetaDataTable, Orientation, DEFAULT_SQL_SERVER};
pub use naming::SheetNaming;
pub use reader::PivotReader;
pub use table::PivotTable;
pub use unpivot::{PivotRow, TableRows, Unpivot};
