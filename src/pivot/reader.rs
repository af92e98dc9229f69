//! Pivot reader: table names, metadata, dimensions and table selection.

use super::metadata::{rank, Dimension, MetaDataTable, Orientation};
use super::naming::{SheetNaming, TableNameRow};
use super::table::PivotTable;
use crate::error::{Error, Result};
use crate::xlsx::{get_or_try_init, Entity, Workbook};
use std::cell::OnceCell;
use std::collections::HashSet;

/// Reads the pivot annotations of a workbook and hands out its tables.
///
/// Marker sheets are read at most once per reader. A marker sheet that
/// cannot be read is logged and treated as empty, so a workbook without
/// annotations reads as plain tables.
///
/// # Example
///
/// ```no_run
/// use sheetpivot::{PivotReader, Workbook};
///
/// let workbook = Workbook::open("crosstab.xlsx")?;
/// let reader = PivotReader::new(&workbook);
/// let table = reader.default_table()?;
/// println!("{:?}", table.column_names()?);
/// for row in table.rows()? {
///     println!("{row:?}");
/// }
/// # Ok::<(), sheetpivot::Error>(())
/// ```
pub struct PivotReader<'a> {
    workbook: &'a Workbook,
    naming: SheetNaming,
    metadata_tables: OnceCell<Vec<MetaDataTable>>,
    dimensions: OnceCell<Vec<Dimension>>,
    table_names: OnceCell<Vec<String>>,
}

impl<'a> PivotReader<'a> {
    /// Create a reader using the workbook's marker prefix.
    pub fn new(workbook: &'a Workbook) -> Self {
        Self {
            workbook,
            naming: SheetNaming::new(&workbook.options().marker_prefix),
            metadata_tables: OnceCell::new(),
            dimensions: OnceCell::new(),
            table_names: OnceCell::new(),
        }
    }

    /// The underlying workbook.
    pub fn workbook(&self) -> &'a Workbook {
        self.workbook
    }

    /// The reserved sheet names in use.
    pub fn naming(&self) -> &SheetNaming {
        &self.naming
    }

    fn try_read_marker<T: Entity>(&self, name: &str) -> Result<Vec<T>> {
        let Some(sheet) = self.workbook.get_worksheet_if_exists(Some(name), true)? else {
            return Ok(Vec::new());
        };
        let entities = sheet.entities::<T>()?.collect::<Result<Vec<T>>>();
        entities
    }

    fn read_marker<T: Entity>(&self, name: &str) -> Vec<T> {
        match self.try_read_marker(name) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("ignoring marker sheet {name}: {e}");
                Vec::new()
            }
        }
    }

    /// Rows of the metadata marker sheet.
    pub fn metadata_tables(&self) -> &[MetaDataTable] {
        self.metadata_tables
            .get_or_init(|| self.read_marker(&self.naming.metadata_sheet()))
    }

    /// All declared dimensions: horizontal ones, then vertical ones, each
    /// ranked in document order.
    pub fn dimensions(&self) -> &[Dimension] {
        self.dimensions.get_or_init(|| {
            let mut dimensions = Vec::new();
            for (sheet, orientation) in [
                (self.naming.horizontal_sheet(), Orientation::Horizontal),
                (self.naming.vertical_sheet(), Orientation::Vertical),
            ] {
                dimensions.extend(self.read_marker::<Dimension>(&sheet).into_iter().map(
                    |mut d| {
                        d.orientation = orientation;
                        d
                    },
                ));
            }
            rank(&mut dimensions);
            dimensions
        })
    }

    /// Table names, without case-insensitive duplicates, in first-seen order.
    ///
    /// Declared names come first, then the sheets named by metadata rows.
    /// Without either, every worksheet outside the reserved prefix is a
    /// table.
    pub fn table_names(&self) -> Result<&[String]> {
        get_or_try_init(&self.table_names, || {
            let worksheets = self.workbook.worksheet_names()?;
            let mut names = UniqueNames::default();

            for sheet in worksheets.iter().filter(|n| self.naming.is_naming_sheet(n)) {
                for row in self.read_marker::<TableNameRow>(sheet) {
                    names.push(row.name);
                }
            }
            for name in MetaDataTable::table_sheets(self.metadata_tables()) {
                names.push(Some(name));
            }

            let names = if names.is_empty() {
                worksheets
                    .into_iter()
                    .filter(|n| !self.naming.is_reserved(n))
                    .collect()
            } else {
                names.into_inner()
            };
            log::debug!("table names: {names:?}");
            Ok(names)
        })
        .map(Vec::as_slice)
    }

    /// Whether the workbook holds more than one table, in which case every
    /// metadata and dimension row binds through its table tag.
    pub fn is_multi_table(&self) -> Result<bool> {
        Ok(self.table_names()?.len() > 1)
    }

    /// The metadata row of a table, or the all-default row.
    pub fn metadata_for(&self, table: &str) -> Result<MetaDataTable> {
        let multi_table = self.is_multi_table()?;
        let table = table.to_lowercase();
        Ok(self
            .metadata_tables()
            .iter()
            .find(|m| !multi_table || m.sheet().is_some_and(|s| s.to_lowercase() == table))
            .cloned()
            .unwrap_or_default())
    }

    /// The dimensions of a table, re-ranked after filtering by table tag.
    pub fn dimensions_for(&self, table: &str) -> Result<Vec<Dimension>> {
        if !self.is_multi_table()? {
            return Ok(self.dimensions().to_vec());
        }
        let mut dimensions: Vec<Dimension> = self
            .dimensions()
            .iter()
            .filter(|d| d.belongs_to(table))
            .cloned()
            .collect();
        rank(&mut dimensions);
        Ok(dimensions)
    }

    /// Every table of the workbook.
    pub fn tables(&self) -> Result<Vec<PivotTable<'a>>> {
        self.table_names()?
            .iter()
            .map(|name| self.table(name))
            .collect()
    }

    /// A table by name. An unknown name yields an empty table.
    pub fn table(&self, name: &str) -> Result<PivotTable<'a>> {
        PivotTable::new(self, name)
    }

    /// The single table of the workbook.
    ///
    /// Fails with [`Error::AmbiguousDefaultTable`] on a multi-table workbook.
    pub fn default_table(&self) -> Result<PivotTable<'a>> {
        self.default_table_named(None)
    }

    /// The named table, or the default table when no name is given.
    pub fn default_table_named(&self, name: Option<&str>) -> Result<PivotTable<'a>> {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return self.table(name);
        }
        if self.is_multi_table()? {
            return Err(Error::AmbiguousDefaultTable);
        }
        match self.table_names()?.first() {
            Some(name) => self.table(name),
            None => {
                let sheet = self.workbook.first_sheet()?;
                self.table(sheet.name())
            }
        }
    }
}

impl std::fmt::Debug for PivotReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PivotReader")
            .field("naming", &self.naming)
            .field("table_names", &self.table_names.get())
            .finish()
    }
}

/// Names deduplicated ignoring case, keeping the first spelling.
#[derive(Default)]
struct UniqueNames {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl UniqueNames {
    fn push(&mut self, name: Option<String>) {
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            return;
        };
        if self.seen.insert(name.to_lowercase()) {
            self.names.push(name);
        }
    }

    fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn into_inner(self) -> Vec<String> {
        self.names
    }
}
