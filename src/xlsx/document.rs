//! Parsed worksheet part: the rows and cells of `<sheetData>`.

use super::address::{parse_reference, MAX_ROW};
use crate::container::attr_value;
use crate::error::{Error, Result};

/// One `<c>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellElement {
    /// 0-based column
    pub column: u32,
    /// The `t` attribute (`s`, `str`, `inlineStr`, `b`, `n`, ...)
    pub cell_type: Option<String>,
    /// Cached value text (`<v>`, or the inline string text)
    pub value: Option<String>,
    /// Formula text (`<f>`)
    pub formula: Option<String>,
}

/// One `<row>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowElement {
    /// 0-based row
    pub index: u32,
    /// Present cells in document order
    pub cells: Vec<CellElement>,
}

impl RowElement {
    /// Whether the row carries any cell element.
    pub fn has_cells(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Find a cell by column.
    pub fn cell(&self, column: u32) -> Option<&CellElement> {
        self.cells.iter().find(|c| c.column == column)
    }
}

/// Which text node is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Formula,
    Inline,
}

/// The rows of one worksheet part, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorksheetDocument {
    rows: Vec<RowElement>,
}

impl WorksheetDocument {
    /// Parse a worksheet XML part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut rows: Vec<RowElement> = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut in_sheet_data = false;
        let mut current_row: Option<RowElement> = None;
        let mut current_cell: Option<CellElement> = None;
        let mut capture = Capture::None;
        let mut phonetic_depth = 0usize;
        let mut next_row = 0u32;
        let mut next_column = 0u32;

        loop {
            let event = reader.read_event_into(&mut buf).map(|e| e.into_owned());
            let is_empty = matches!(event, Ok(quick_xml::events::Event::Empty(_)));
            match event {
                Ok(quick_xml::events::Event::Start(ref e))
                | Ok(quick_xml::events::Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"sheetData" => in_sheet_data = !is_empty,
                    b"row" if in_sheet_data => {
                        let mut index = next_row;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                match attr_value(&attr).trim().parse::<u32>() {
                                    Ok(r) if r > 0 && r - 1 <= MAX_ROW => index = r - 1,
                                    _ => log::warn!("ignoring malformed row number"),
                                }
                            }
                        }
                        next_row = index.saturating_add(1);
                        next_column = 0;
                        let row = RowElement {
                            index,
                            cells: Vec::new(),
                        };
                        if is_empty {
                            rows.push(row);
                        } else {
                            current_row = Some(row);
                        }
                    }
                    b"c" if current_row.is_some() => {
                        let mut cell = CellElement {
                            column: next_column,
                            ..Default::default()
                        };
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    let reference = attr_value(&attr);
                                    match parse_reference(&reference) {
                                        Ok((column, _)) => cell.column = column,
                                        Err(_) => log::warn!(
                                            "ignoring malformed cell reference {reference}"
                                        ),
                                    }
                                }
                                b"t" => cell.cell_type = Some(attr_value(&attr)),
                                _ => {}
                            }
                        }
                        next_column = cell.column.saturating_add(1);
                        if is_empty {
                            if let Some(ref mut row) = current_row {
                                row.cells.push(cell);
                            }
                        } else {
                            current_cell = Some(cell);
                        }
                    }
                    b"v" if current_cell.is_some() && !is_empty => capture = Capture::Value,
                    b"f" if current_cell.is_some() && !is_empty => capture = Capture::Formula,
                    b"rPh" if current_cell.is_some() && !is_empty => phonetic_depth += 1,
                    b"t" if current_cell.is_some() && !is_empty && phonetic_depth == 0 => {
                        capture = Capture::Inline
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if let Some(ref mut cell) = current_cell {
                        let text = e.unescape().unwrap_or_default();
                        match capture {
                            Capture::Value | Capture::Inline => {
                                cell.value.get_or_insert_with(String::new).push_str(&text)
                            }
                            Capture::Formula => {
                                cell.formula.get_or_insert_with(String::new).push_str(&text)
                            }
                            Capture::None => {}
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.local_name().as_ref() {
                    b"sheetData" => in_sheet_data = false,
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            rows.push(row);
                        }
                    }
                    b"c" => {
                        if let (Some(cell), Some(row)) = (current_cell.take(), current_row.as_mut())
                        {
                            row.cells.push(cell);
                        }
                        capture = Capture::None;
                    }
                    b"v" | b"f" | b"t" => capture = Capture::None,
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        log::debug!("parsed worksheet with {} rows", rows.len());
        Ok(Self { rows })
    }

    /// All present rows in document order.
    pub fn rows(&self) -> &[RowElement] {
        &self.rows
    }

    /// Find a row by its 0-based index.
    pub fn row(&self, index: u32) -> Option<&RowElement> {
        self.rows.iter().find(|r| r.index == index)
    }

    /// Whether `<sheetData>` has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
