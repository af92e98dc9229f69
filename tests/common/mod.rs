//! Synthetic xlsx packages for integration tests.

#![allow(dead_code)]

use sheetpivot::Workbook;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Convert a 0-based column to letters.
pub fn letters(column: usize) -> String {
    sheetpivot::xlsx::column_name(column as u32)
}

/// `<sheetData>` content for a grid of literal string cells; empty texts
/// leave the cell out.
pub fn grid(rows: &[&[&str]]) -> String {
    let mut xml = String::new();
    for (r, cells) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, text) in cells.iter().enumerate() {
            if !text.is_empty() {
                xml.push_str(&format!(
                    r#"<c r="{}{}" t="str"><v>{}</v></c>"#,
                    letters(c),
                    r + 1,
                    text
                ));
            }
        }
        xml.push_str("</row>");
    }
    xml
}

/// A cell holding a formula (with a dummy cached value).
pub fn formula_cell(reference: &str, formula: &str) -> String {
    format!(r#"<c r="{reference}" t="str"><f>{formula}</f><v>0</v></c>"#)
}

/// A cell holding a literal string.
pub fn text_cell(reference: &str, text: &str) -> String {
    format!(r#"<c r="{reference}" t="str"><v>{text}</v></c>"#)
}

/// A row element wrapping prepared cells.
pub fn row(number: u32, cells: &[String]) -> String {
    format!(r#"<row r="{number}">{}</row>"#, cells.concat())
}

/// Builds minimal spreadsheet packages in memory.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<(String, Option<String>)>,
    shared: Option<String>,
    manifest: bool,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self {
            manifest: true,
            ..Default::default()
        }
    }

    /// Add a sheet with raw `<sheetData>` content.
    pub fn sheet(mut self, name: &str, sheet_data: impl Into<String>) -> Self {
        self.sheets.push((name.to_string(), Some(sheet_data.into())));
        self
    }

    /// Add a sheet of literal string cells.
    pub fn grid_sheet(self, name: &str, rows: &[&[&str]]) -> Self {
        self.sheet(name, grid(rows))
    }

    /// Declare a sheet in the manifest without a relationship or part.
    pub fn orphan_sheet(mut self, name: &str) -> Self {
        self.sheets.push((name.to_string(), None));
        self
    }

    /// Add a shared string table of plain texts.
    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        let items: String = strings
            .iter()
            .map(|s| format!("<si><t>{s}</t></si>"))
            .collect();
        self.shared = Some(items);
        self
    }

    /// Add a shared string table from raw `<si>` elements.
    pub fn shared_items(mut self, items: &str) -> Self {
        self.shared = Some(items.to_string());
        self
    }

    /// Leave out `xl/workbook.xml`.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#,
        )
        .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        )
        .unwrap();

        let mut manifest = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>"#,
        );
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for (i, (name, data)) in self.sheets.iter().enumerate() {
            let n = i + 1;
            manifest.push_str(&format!(
                r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#
            ));
            if let Some(data) = data {
                rels.push_str(&format!(
                    r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
                ));
                zip.start_file(format!("xl/worksheets/sheet{n}.xml"), options)
                    .unwrap();
                zip.write_all(
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
                    )
                    .as_bytes(),
                )
                .unwrap();
            }
        }
        manifest.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        if self.manifest {
            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(manifest.as_bytes()).unwrap();
            zip.start_file("xl/_rels/workbook.xml.rels", options)
                .unwrap();
            zip.write_all(rels.as_bytes()).unwrap();
        }

        if let Some(items) = &self.shared {
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{items}</sst>"#
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
        buffer
    }

    pub fn workbook(&self) -> Workbook {
        init_logging();
        Workbook::from_bytes(self.build()).unwrap()
    }
}
