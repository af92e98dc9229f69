//! Pivot table: origins, data sheet and column names of one table.

use super::metadata::{Dimension, MetaDataTable, Orientation};
use super::reader::PivotReader;
use super::unpivot::{TableRows, Unpivot};
use crate::error::Result;
use crate::xlsx::{CellAddress, Sheet};

/// One table of a workbook, ready to be unpivoted.
///
/// Without dimensions the table reads as a plain headered sheet whose
/// header row sits at the label origin.
pub struct PivotTable<'a> {
    name: String,
    metadata: MetaDataTable,
    measure: String,
    dimensions: Vec<Dimension>,
    label_origin: CellAddress,
    data_origin: CellAddress,
    data_sheet: Option<Sheet<'a>>,
}

/// Keep a parsed origin, logging and dropping one that does not parse.
fn recover(origin: Result<Option<CellAddress>>, table: &str) -> Option<CellAddress> {
    origin.unwrap_or_else(|e| {
        log::warn!("table {table}: {e}");
        None
    })
}

impl<'a> PivotTable<'a> {
    pub(crate) fn new(reader: &PivotReader<'a>, name: &str) -> Result<Self> {
        let workbook = reader.workbook();
        let known = reader
            .table_names()?
            .iter()
            .any(|n| n.to_lowercase() == name.to_lowercase());

        let (metadata, dimensions) = if known {
            (reader.metadata_for(name)?, reader.dimensions_for(name)?)
        } else {
            log::debug!("{name} is not a declared table");
            (MetaDataTable::default(), Vec::new())
        };

        let label = recover(metadata.label_origin_address(), name);
        let data = recover(metadata.data_origin_address(), name);

        let sheet_name = label
            .as_ref()
            .and_then(CellAddress::sheet)
            .or_else(|| data.as_ref().and_then(CellAddress::sheet))
            .unwrap_or(name)
            .to_string();
        let mut data_sheet = workbook.get_worksheet_if_exists(Some(&sheet_name), false)?;
        if data_sheet.is_none() {
            log::debug!("table {name}: no worksheet named {sheet_name}");
        }

        let horizontal = count(&dimensions, Orientation::Horizontal) as i64;
        let vertical = count(&dimensions, Orientation::Vertical) as i64;
        let plain = dimensions.is_empty();

        let mut headerless = false;
        let label_origin = match (label, &data) {
            (Some(label), _) => label,
            (None, Some(data)) if plain => data.shifted(0, -1).unwrap_or_else(|| {
                headerless = true;
                data.clone()
            }),
            (None, data) => {
                match data.as_ref().and_then(|d| d.shifted(-vertical, -horizontal)) {
                    Some(label) => label,
                    None => data_sheet
                        .as_ref()
                        .map(Sheet::left_corner)
                        .transpose()?
                        .flatten()
                        .unwrap_or_else(CellAddress::origin),
                }
            }
        };

        let data_origin = match data {
            Some(data) => data,
            None => {
                let (columns, rows) = if plain { (0, 1) } else { (vertical, horizontal) };
                label_origin
                    .shifted(columns, rows)
                    .unwrap_or_else(|| label_origin.clone())
            }
        };

        if plain {
            if let Some(sheet) = data_sheet.as_mut() {
                sheet.set_header_address((!headerless).then(|| label_origin.clone()));
            }
        }

        log::debug!(
            "table {name}: label origin {label_origin}, data origin {data_origin}, {} dimensions",
            dimensions.len()
        );

        let measure = metadata
            .measure_or(&workbook.options().default_measure)
            .to_string();

        Ok(Self {
            name: name.to_string(),
            metadata,
            measure,
            dimensions,
            label_origin,
            data_origin,
            data_sheet,
        })
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table's metadata row (all defaults when none was declared).
    pub fn metadata(&self) -> &MetaDataTable {
        &self.metadata
    }

    /// Name of the measure column.
    pub fn measure_name(&self) -> &str {
        &self.measure
    }

    /// Target database table: the metadata's, else the table name.
    pub fn database_table(&self) -> &str {
        self.metadata.table.as_deref().unwrap_or(&self.name)
    }

    /// Horizontal dimensions, then vertical ones.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Dimensions labelled above the data block, outermost first.
    pub fn horizontal(&self) -> impl Iterator<Item = &Dimension> {
        self.oriented(Orientation::Horizontal)
    }

    /// Dimensions labelled left of the data block, outermost first.
    pub fn vertical(&self) -> impl Iterator<Item = &Dimension> {
        self.oriented(Orientation::Vertical)
    }

    fn oriented(&self, orientation: Orientation) -> impl Iterator<Item = &Dimension> {
        self.dimensions
            .iter()
            .filter(move |d| d.orientation == orientation)
    }

    /// Top left corner of the label stripes (or the header cell).
    pub fn label_origin(&self) -> &CellAddress {
        &self.label_origin
    }

    /// First measure cell.
    pub fn data_origin(&self) -> &CellAddress {
        &self.data_origin
    }

    /// The worksheet holding the table, if it exists.
    pub fn data_sheet(&self) -> Option<&Sheet<'a>> {
        self.data_sheet.as_ref()
    }

    /// Output column names.
    ///
    /// Without dimensions these are the header names of the data sheet;
    /// otherwise the measure name followed by the dimension names.
    pub fn column_names(&self) -> Result<Vec<String>> {
        if self.dimensions.is_empty() {
            return match &self.data_sheet {
                Some(sheet) => sheet.column_names(),
                None => Ok(Vec::new()),
            };
        }
        Ok(std::iter::once(self.measure.clone())
            .chain(self.horizontal().map(|d| d.name.clone()))
            .chain(self.vertical().map(|d| d.name.clone()))
            .collect())
    }

    /// Rows of the table.
    ///
    /// Every call starts a fresh pass; label state never leaks between
    /// passes.
    pub fn rows(&self) -> Result<TableRows<'_>> {
        let Some(sheet) = &self.data_sheet else {
            return Ok(TableRows::empty());
        };
        if self.dimensions.is_empty() {
            return Ok(TableRows::plain(Box::new(sheet.rows()?)));
        }
        Ok(TableRows::pivot(Unpivot::new(
            sheet.all_rows()?,
            sheet.contents()?,
            &self.measure,
            self.horizontal().map(|d| d.name.as_str()).collect(),
            self.vertical().map(|d| d.name.as_str()).collect(),
            self.data_origin.position().unwrap_or_default(),
        )))
    }
}

fn count(dimensions: &[Dimension], orientation: Orientation) -> usize {
    dimensions
        .iter()
        .filter(|d| d.orientation == orientation)
        .count()
}

impl std::fmt::Debug for PivotTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PivotTable")
            .field("name", &self.name)
            .field("measure", &self.measure)
            .field("dimensions", &self.dimensions)
            .field("label_origin", &self.label_origin)
            .field("data_origin", &self.data_origin)
            .finish()
    }
}
