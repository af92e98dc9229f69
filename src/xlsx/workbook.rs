//! Workbook: the package handle plus its memoized catalog and string pool.

use super::catalog::{SheetCatalog, SheetEntry, WORKBOOK_PART};
use super::get_or_try_init;
use super::shared_strings::SharedStrings;
use super::sheet::Sheet;
use crate::container::{OoxmlContainer, Relationships};
use crate::error::{Error, Result};
use crate::options::ReaderOptions;
use std::cell::OnceCell;
use std::io::Read;
use std::path::Path;

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const WORKSHEETS_DIR: &str = "xl/worksheets/";
const FALLBACK_SHEET: &str = "sheet1";

/// An opened OOXML spreadsheet package.
///
/// The catalog, the workbook relationships and the shared string table are
/// each parsed at most once, on first use. A `Workbook` is meant for one
/// thread; the caches are not synchronized.
///
/// # Example
///
/// ```no_run
/// use sheetpivot::Workbook;
///
/// let workbook = Workbook::open("report.xlsx")?;
/// for name in workbook.worksheet_names()? {
///     let sheet = workbook.worksheet(&name)?;
///     for row in sheet.rows()? {
///         for (column, value) in row {
///             println!("{column}: {value}");
///         }
///     }
/// }
/// # Ok::<(), sheetpivot::Error>(())
/// ```
pub struct Workbook {
    container: OoxmlContainer,
    options: ReaderOptions,
    catalog: OnceCell<SheetCatalog>,
    relationships: OnceCell<Relationships>,
    shared_strings: OnceCell<SharedStrings>,
}

impl Workbook {
    /// Open a workbook from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_container(OoxmlContainer::open(path)?))
    }

    /// Open a workbook from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::from_container(OoxmlContainer::from_bytes(data)?))
    }

    /// Open a workbook from a reader; the stream is buffered completely.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_container(OoxmlContainer::from_reader(reader)?))
    }

    /// Wrap an already opened container.
    pub fn from_container(container: OoxmlContainer) -> Self {
        Self {
            container,
            options: ReaderOptions::default(),
            catalog: OnceCell::new(),
            relationships: OnceCell::new(),
            shared_strings: OnceCell::new(),
        }
    }

    /// Replace the reader options.
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// The reader options.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Get a reference to the container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// The sheet catalog from `xl/workbook.xml`.
    pub fn catalog(&self) -> Result<&SheetCatalog> {
        get_or_try_init(&self.catalog, || SheetCatalog::read(&self.container))
    }

    /// The shared string table; empty when the package has none.
    pub fn shared_strings(&self) -> Result<&SharedStrings> {
        get_or_try_init(&self.shared_strings, || {
            match self.container.read_xml(SHARED_STRINGS_PART)? {
                Some(xml) => SharedStrings::parse(&xml),
                None => Ok(SharedStrings::default()),
            }
        })
    }

    fn relationships(&self) -> Result<&Relationships> {
        get_or_try_init(&self.relationships, || {
            self.container.read_relationships(WORKBOOK_PART)
        })
    }

    /// Worksheet part names (file stems under `xl/worksheets/`), sorted.
    pub fn worksheet_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .container
            .list_files_with_prefix(WORKSHEETS_DIR)
            .into_iter()
            .filter_map(|path| {
                let file = path.strip_prefix(WORKSHEETS_DIR)?;
                if file.is_empty() || file.contains('/') {
                    return None;
                }
                let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
                Some(stem.to_string())
            })
            .collect();
        ids.sort();
        ids
    }

    /// Sheet names in manifest order.
    pub fn worksheet_names(&self) -> Result<Vec<String>> {
        Ok(self.catalog()?.names().map(String::from).collect())
    }

    /// Sheet entries in manifest order.
    pub fn sheet_entries(&self) -> Result<&[SheetEntry]> {
        Ok(self.catalog()?.entries())
    }

    /// Whether a sheet with this name exists, ignoring case.
    pub fn has_worksheet(&self, name: &str) -> Result<bool> {
        Ok(self.catalog()?.contains(name))
    }

    /// Open a worksheet.
    ///
    /// Without a name the first sheet of the manifest is opened. Fails with
    /// [`Error::WorksheetNotFound`] when the name, its relationship, or its
    /// part cannot be resolved.
    pub fn get_worksheet(&self, name: Option<&str>, has_header: bool) -> Result<Sheet<'_>> {
        let catalog = self.catalog()?;
        let name = match name {
            Some(name) => name,
            None => catalog.names().next().unwrap_or(FALLBACK_SHEET),
        };
        let not_found = || Error::WorksheetNotFound(name.to_string());

        let entry = catalog.get(name).ok_or_else(not_found)?;
        let relationship = self.relationships()?.get(&entry.rel_id).ok_or_else(not_found)?;
        let part_path = OoxmlContainer::resolve_path(WORKBOOK_PART, &relationship.target);
        if !self.container.exists(&part_path) {
            return Err(not_found());
        }

        log::debug!("resolved worksheet {} to {}", entry.name, part_path);
        Ok(Sheet::new(self, entry.name.clone(), part_path, has_header))
    }

    /// Open a worksheet if the catalog knows its name, `Ok(None)` otherwise.
    pub fn get_worksheet_if_exists(
        &self,
        name: Option<&str>,
        has_header: bool,
    ) -> Result<Option<Sheet<'_>>> {
        let known = match name {
            Some(name) => self.has_worksheet(name)?,
            None => !self.catalog()?.is_empty(),
        };
        if !known {
            return Ok(None);
        }
        self.get_worksheet(name, has_header).map(Some)
    }

    /// Open a worksheet with a header row.
    pub fn worksheet(&self, name: &str) -> Result<Sheet<'_>> {
        self.get_worksheet(Some(name), true)
    }

    /// Open the first worksheet with a header row.
    pub fn first_sheet(&self) -> Result<Sheet<'_>> {
        self.get_worksheet(None, true)
    }
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("container", &self.container)
            .field("options", &self.options)
            .finish()
    }
}
