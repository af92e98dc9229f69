//! Worksheet reader.

use super::address::{default_header, CellAddress};
use super::cell::CellContents;
use super::document::{RowElement, WorksheetDocument};
use super::get_or_try_init;
use super::projection::{ColumnMap, ContentType, Entity};
use super::workbook::Workbook;
use crate::error::Result;
use std::cell::OnceCell;
use std::fmt;

/// One data row as (column name, text) pairs in column order.
///
/// Null cells are left out. Duplicate header names are kept as they are.
pub type KeyedRow = Vec<(String, String)>;

/// The resolved header of a sheet.
#[derive(Debug, Clone, Default)]
struct HeaderRow {
    /// 0-based header row; data rows lie strictly below it
    row: Option<u32>,
    address: Option<CellAddress>,
    names: Vec<Option<String>>,
}

impl HeaderRow {
    fn name(&self, position: usize) -> String {
        match self.names.get(position) {
            Some(Some(name)) if !name.is_empty() => name.clone(),
            _ => default_header(position as u32),
        }
    }

    fn keyed(&self, values: Vec<Option<String>>) -> KeyedRow {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| Some((self.name(i), value?)))
            .collect()
    }
}

/// A view of one worksheet.
///
/// The parsed document and the header are computed on first use and kept
/// for the lifetime of the view.
pub struct Sheet<'a> {
    workbook: &'a Workbook,
    name: String,
    part_path: String,
    has_header: bool,
    header_address: Option<CellAddress>,
    explicit_header: Option<Vec<Option<String>>>,
    document: OnceCell<WorksheetDocument>,
    header: OnceCell<HeaderRow>,
}

impl<'a> Sheet<'a> {
    pub(crate) fn new(
        workbook: &'a Workbook,
        name: String,
        part_path: String,
        has_header: bool,
    ) -> Self {
        Self {
            workbook,
            name,
            part_path,
            has_header,
            header_address: None,
            explicit_header: None,
            document: OnceCell::new(),
            header: OnceCell::new(),
        }
    }

    /// Sheet name as declared in the manifest.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package path of the worksheet part.
    pub fn part_path(&self) -> &str {
        &self.part_path
    }

    /// Whether the first (or addressed) row is a header.
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// The workbook this sheet belongs to.
    pub fn workbook(&self) -> &'a Workbook {
        self.workbook
    }

    /// The parsed worksheet part.
    pub fn document(&self) -> Result<&WorksheetDocument> {
        get_or_try_init(&self.document, || {
            let xml = self.workbook.container().read_xml(&self.part_path)?;
            match xml {
                Some(xml) => WorksheetDocument::parse(&xml),
                None => Ok(WorksheetDocument::default()),
            }
        })
    }

    /// Cell value resolver bound to the workbook's string pool.
    pub fn contents(&self) -> Result<CellContents<'a>> {
        Ok(CellContents::new(self.workbook.shared_strings()?))
    }

    fn resolved_header(&self) -> Result<&HeaderRow> {
        get_or_try_init(&self.header, || self.read_header())
    }

    fn read_header(&self) -> Result<HeaderRow> {
        if !self.has_header {
            return Ok(HeaderRow {
                names: self.explicit_header.clone().unwrap_or_default(),
                ..Default::default()
            });
        }

        // Explicit names only claim a row when an address places them
        if let Some(names) = &self.explicit_header {
            let address = self.header_address.clone();
            return Ok(HeaderRow {
                row: address.as_ref().and_then(CellAddress::row),
                address,
                names: names.clone(),
            });
        }

        let document = self.document()?;
        let (index, row) = match self.header_address.as_ref().and_then(CellAddress::row) {
            Some(index) => (Some(index), document.row(index)),
            None => {
                let first = document.rows().first();
                (first.map(|r| r.index), first)
            }
        };

        let address = match &self.header_address {
            Some(address) => Some(address.clone()),
            None => row.map(|r| CellAddress::new(r.cells.first().map_or(0, |c| c.column), r.index)),
        };

        let names = match row {
            Some(row) => {
                let trim = self.workbook.options().trim_header;
                self.contents()?
                    .values(row)
                    .into_iter()
                    .map(|v| v.map(|s| if trim { s.trim().to_string() } else { s }))
                    .collect()
            }
            None => Vec::new(),
        };

        log::debug!("sheet {} header row {:?}: {} names", self.name, index, names.len());
        Ok(HeaderRow {
            row: index,
            address,
            names,
        })
    }

    /// Header cells by position; `None` where the header has no text.
    pub fn header(&self) -> Result<&[Option<String>]> {
        Ok(&self.resolved_header()?.names)
    }

    /// Header names with a placeholder (`?` + column letters) for every gap.
    pub fn header_names(&self) -> Result<Vec<String>> {
        let header = self.resolved_header()?;
        Ok((0..header.names.len()).map(|i| header.name(i)).collect())
    }

    /// Header names present in the sheet, skipping empty cells.
    pub fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .header()?
            .iter()
            .flatten()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect())
    }

    /// Address of the header's first cell, once a header is known.
    pub fn header_address(&self) -> Result<Option<CellAddress>> {
        if !self.has_header {
            return Ok(self.header_address.clone());
        }
        Ok(self.resolved_header()?.address.clone())
    }

    /// Override the header names. An empty list turns the header off.
    ///
    /// The names occupy no row unless a header address was set, so every row
    /// of a headerless sheet stays data.
    pub fn set_header(&mut self, names: Vec<String>) {
        self.has_header = !names.is_empty();
        self.explicit_header = Some(names.into_iter().map(Some).collect());
        self.header.take();
    }

    /// Read the header from the row of `address`; `None` turns the header off.
    pub fn set_header_address(&mut self, address: Option<CellAddress>) {
        self.has_header = address.is_some();
        self.header_address = address;
        self.explicit_header = None;
        self.header.take();
    }

    /// Every present row, header included.
    pub fn all_rows(&self) -> Result<&[RowElement]> {
        Ok(self.document()?.rows())
    }

    /// Present rows strictly below the header row.
    pub fn data_rows(&self) -> Result<impl Iterator<Item = &RowElement> + '_> {
        let header_row = if self.has_header {
            self.resolved_header()?.row
        } else {
            None
        };
        Ok(self
            .document()?
            .rows()
            .iter()
            .filter(move |row| header_row.map_or(true, |h| row.index > h)))
    }

    /// Data rows as (column name, text) pairs.
    pub fn rows(&self) -> Result<impl Iterator<Item = KeyedRow> + '_> {
        let contents = self.contents()?;
        let header = self.resolved_header()?;
        Ok(self
            .data_rows()?
            .map(move |row| header.keyed(contents.values(row))))
    }

    /// Value at a 0-based (column, row) position.
    pub fn cell(&self, column: u32, row: u32) -> Result<Option<String>> {
        let contents = self.contents()?;
        Ok(self
            .document()?
            .row(row)
            .and_then(|r| r.cell(column))
            .and_then(|c| contents.value(c)))
    }

    /// Value at an address; the sheet qualifier is ignored.
    pub fn cell_by_address(&self, address: &CellAddress) -> Result<Option<String>> {
        match address.position() {
            Some((column, row)) => self.cell(column, row),
            None => Ok(None),
        }
    }

    /// Value at an A1-style address text.
    pub fn cell_at(&self, address: &str) -> Result<Option<String>> {
        self.cell_by_address(&CellAddress::parse(address)?)
    }

    /// Visit every non-null cell as (column, row, text), header included,
    /// until the callback returns `false`.
    pub fn cells_by_row<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(u32, u32, &str) -> bool,
    {
        let contents = self.contents()?;
        for row in self.all_rows()? {
            for (x, value) in contents.values(row).iter().enumerate() {
                if let Some(value) = value {
                    if !visit(x as u32, row.index, value) {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// First cell of the first row whose leading cell sits in the leftmost
    /// column used by any row.
    pub fn left_corner(&self) -> Result<Option<CellAddress>> {
        let rows = self.all_rows()?;
        let leading = |row: &RowElement| row.cells.first().map(|c| c.column);
        let Some(min) = rows.iter().filter_map(leading).min() else {
            return Ok(None);
        };
        Ok(rows
            .iter()
            .find(|row| leading(row) == Some(min))
            .map(|row| CellAddress::new(min, row.index)))
    }

    /// Project every data row onto `T`.
    ///
    /// Cells whose header name is not bound by `T`'s column table are
    /// skipped; a row binding no field at all is dropped.
    pub fn entities<'s, T: Entity + 's>(
        &'s self,
    ) -> Result<impl Iterator<Item = Result<T>> + 's> {
        let contents = self.contents()?;
        let header = self.resolved_header()?;
        let map = ColumnMap::<T>::of();

        Ok(self.data_rows()?.filter_map(move |row| {
            let values = contents.values_with(row, |cell, position| {
                match map.content_type(Some(&header.name(position))) {
                    ContentType::Data => contents.value(cell),
                    ContentType::Formula => contents.formula(cell),
                }
            });

            let mut entity = T::default();
            let mut mapped = 0usize;
            for (position, value) in values.iter().enumerate() {
                let Some(value) = value else { continue };
                if let Some(column) = map.find(Some(&header.name(position))) {
                    if let Err(e) = column.assign(&mut entity, value) {
                        return Some(Err(e));
                    }
                    mapped += 1;
                }
            }
            (mapped > 0).then_some(Ok(entity))
        }))
    }
}

impl fmt::Debug for Sheet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("name", &self.name)
            .field("part_path", &self.part_path)
            .field("has_header", &self.has_header)
            .field("header_address", &self.header_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::projection::{parse_field, Column};
    use crate::xlsx::testing::{grid, workbook};

    fn pairs(items: &[(&str, &str)]) -> KeyedRow {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_read() {
        let wb = workbook(
            &[("People", grid(&[&["Name", "Age"], &["Ann", "30"], &["Bo", "25"]]))],
            &[],
        );
        let sheet = wb.worksheet("People").unwrap();
        let rows: Vec<_> = sheet.rows().unwrap().collect();
        assert_eq!(
            rows,
            vec![
                pairs(&[("Name", "Ann"), ("Age", "30")]),
                pairs(&[("Name", "Bo"), ("Age", "25")]),
            ]
        );
        assert_eq!(sheet.header_address().unwrap().unwrap().to_string(), "A1");
    }

    #[test]
    fn test_sparse_row_keeps_alignment() {
        let wb = workbook(
            &[("S", grid(&[&["A", "B", "C"], &["", "", "x"]]))],
            &[],
        );
        let sheet = wb.worksheet("S").unwrap();
        let rows: Vec<_> = sheet.rows().unwrap().collect();
        assert_eq!(rows, vec![pairs(&[("C", "x")])]);
    }

    #[test]
    fn test_placeholder_and_trimmed_header() {
        let wb = workbook(&[("S", grid(&[&[" Id ", "", "Name"], &["1", "2", "n"]]))], &[]);
        let sheet = wb.worksheet("S").unwrap();
        assert_eq!(sheet.header_names().unwrap(), vec!["Id", "?B", "Name"]);
        assert_eq!(sheet.column_names().unwrap(), vec!["Id", "Name"]);
        let rows: Vec<_> = sheet.rows().unwrap().collect();
        assert_eq!(rows, vec![pairs(&[("Id", "1"), ("?B", "2"), ("Name", "n")])]);
    }

    #[test]
    fn test_headerless_read_uses_placeholders() {
        let wb = workbook(&[("S", grid(&[&["a", "b"], &["c", "d"]]))], &[]);
        let sheet = wb.get_worksheet(Some("S"), false).unwrap();
        let rows: Vec<_> = sheet.rows().unwrap().collect();
        assert_eq!(
            rows,
            vec![pairs(&[("?A", "a"), ("?B", "b")]), pairs(&[("?A", "c"), ("?B", "d")])]
        );
        assert_eq!(sheet.header_address().unwrap(), None);
    }

    #[test]
    fn test_header_overrides() {
        let wb = workbook(
            &[("S", grid(&[&["title"], &["X", "Y"], &["1", "2"]]))],
            &[],
        );
        let mut sheet = wb.get_worksheet(Some("S"), false).unwrap();

        sheet.set_header_address(Some(CellAddress::parse("A2").unwrap()));
        assert!(sheet.has_header());
        let rows: Vec<_> = sheet.rows().unwrap().collect();
        assert_eq!(rows, vec![pairs(&[("X", "1"), ("Y", "2")])]);

        sheet.set_header(vec!["P".into(), "Q".into()]);
        assert_eq!(sheet.header_names().unwrap(), vec!["P", "Q"]);

        sheet.set_header(Vec::new());
        assert!(!sheet.has_header());
        assert_eq!(sheet.rows().unwrap().count(), 3);
    }

    #[test]
    fn test_named_headerless_sheet_keeps_every_row() {
        let wb = workbook(&[("S", grid(&[&["a", "b"], &["c", "d"]]))], &[]);
        let mut sheet = wb.get_worksheet(Some("S"), false).unwrap();
        sheet.set_header(vec!["P".into(), "Q".into()]);

        assert!(sheet.has_header());
        assert_eq!(sheet.header_address().unwrap(), None);
        let rows: Vec<_> = sheet.rows().unwrap().collect();
        assert_eq!(
            rows,
            vec![pairs(&[("P", "a"), ("Q", "b")]), pairs(&[("P", "c"), ("Q", "d")])]
        );
    }

    #[test]
    fn test_shared_string_cells() {
        let data = r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="str"><v>0</v></c></row>"#;
        let wb = workbook(&[("S", data.to_string())], &["pooled"]);
        let sheet = wb.get_worksheet(Some("S"), false).unwrap();
        assert_eq!(sheet.cell(0, 0).unwrap().as_deref(), Some("pooled"));
        assert_eq!(sheet.cell_at("B1").unwrap().as_deref(), Some("0"));
        assert_eq!(sheet.cell_at("C9").unwrap(), None);
        assert!(sheet.cell_at("not an address").is_err());
    }

    #[test]
    fn test_cells_by_row_stops() {
        let wb = workbook(&[("S", grid(&[&["a", "", "c"], &["d"]]))], &[]);
        let sheet = wb.worksheet("S").unwrap();
        let mut seen = Vec::new();
        sheet
            .cells_by_row(|c, r, v| {
                seen.push((c, r, v.to_string()));
                seen.len() < 2
            })
            .unwrap();
        assert_eq!(seen, vec![(0, 0, "a".to_string()), (2, 0, "c".to_string())]);
    }

    #[test]
    fn test_left_corner() {
        let wb = workbook(&[("S", grid(&[&["", "", "t"], &["", "x", "y"], &["", "z"]]))], &[]);
        let sheet = wb.worksheet("S").unwrap();
        assert_eq!(sheet.left_corner().unwrap().unwrap().to_string(), "B2");

        let empty = workbook(&[("E", String::new())], &[]);
        assert_eq!(empty.worksheet("E").unwrap().left_corner().unwrap(), None);
    }

    #[derive(Default, Debug, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        origin: String,
    }

    impl Entity for Person {
        fn columns() -> Vec<Column<Self>> {
            vec![
                Column::new("name", |p: &mut Person, v| {
                    p.name = v.to_string();
                    Ok(())
                })
                .case_insensitive(),
                Column::new("Age", |p: &mut Person, v| {
                    p.age = parse_field(v)?;
                    Ok(())
                }),
                Column::new("Origin", |p: &mut Person, v| {
                    p.origin = v.to_string();
                    Ok(())
                })
                .formula(),
            ]
        }
    }

    #[test]
    fn test_entities() {
        let data = r#"
            <row r="1"><c r="A1" t="str"><v>NAME</v></c><c r="B1" t="str"><v>AGE</v></c><c r="C1" t="str"><v>Origin</v></c><c r="D1" t="str"><v>Other</v></c></row>
            <row r="2"><c r="A2" t="str"><v>Ann</v></c><c r="B2"><v>30</v></c><c r="C2" t="str"><f>Data!B2</f><v>x</v></c></row>
            <row r="3"><c r="D3" t="str"><v>ignored</v></c></row>
            <row r="4"><c r="B4"><v>7</v></c></row>"#;
        let wb = workbook(&[("S", data.to_string())], &[]);
        let sheet = wb.worksheet("S").unwrap();
        let people: Vec<Person> = sheet
            .entities::<Person>()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            people,
            vec![
                Person {
                    name: "Ann".into(),
                    age: 30,
                    origin: "Data!B2".into()
                },
                Person {
                    age: 7,
                    ..Default::default()
                },
            ]
        );
    }

    #[test]
    fn test_entity_field_error() {
        let wb = workbook(&[("S", grid(&[&["Age"], &["old"]]))], &[]);
        let sheet = wb.worksheet("S").unwrap();
        let first = sheet.entities::<Person>().unwrap().next().unwrap();
        assert!(matches!(first, Err(crate::Error::InvalidData(_))));
    }
}
