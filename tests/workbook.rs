//! Worksheet reading through the public API.

mod common;

use common::{row, text_cell, XlsxBuilder};
use sheetpivot::xlsx::parse_field;
use sheetpivot::{Column, Entity, Error, KeyedRow, Workbook};
use std::io::Write;

fn pairs(items: &[(&str, &str)]) -> KeyedRow {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_plain_read() {
    let workbook = XlsxBuilder::new()
        .grid_sheet("People", &[&["Name", "Age"], &["Ann", "30"], &["Bo", "25"]])
        .workbook();

    let sheet = workbook.worksheet("people").unwrap();
    let rows: Vec<KeyedRow> = sheet.rows().unwrap().collect();
    assert_eq!(
        rows,
        vec![
            pairs(&[("Name", "Ann"), ("Age", "30")]),
            pairs(&[("Name", "Bo"), ("Age", "25")]),
        ]
    );
}

#[test]
fn test_sparse_row_binds_to_its_column() {
    let workbook = XlsxBuilder::new()
        .grid_sheet("S", &[&["First", "Second", "Third"], &["", "", "only"]])
        .workbook();

    let sheet = workbook.worksheet("S").unwrap();
    let rows: Vec<KeyedRow> = sheet.rows().unwrap().collect();
    assert_eq!(rows, vec![pairs(&[("Third", "only")])]);
}

#[test]
fn test_placeholder_header_beyond_z() {
    let mut header = vec!["Id"; 26];
    header.push("");
    header.push("Last");
    let mut data = vec![""; 26];
    data.push("aa");
    let workbook = XlsxBuilder::new()
        .grid_sheet("Wide", &[&header, &data])
        .workbook();

    let sheet = workbook.worksheet("Wide").unwrap();
    assert_eq!(sheet.header_names().unwrap()[26], "?AA");
    let rows: Vec<KeyedRow> = sheet.rows().unwrap().collect();
    assert_eq!(rows, vec![pairs(&[("?AA", "aa")])]);
}

#[test]
fn test_shared_and_literal_strings() {
    let data = row(
        1,
        &[
            r#"<c r="A1" t="s"><v>0</v></c>"#.to_string(),
            r#"<c r="B1" t="str"><v>0</v></c>"#.to_string(),
            r#"<c r="C1" t="s"><v>1</v></c>"#.to_string(),
            r#"<c r="D1" t="inlineStr"><is><t>inline</t></is></c>"#.to_string(),
            r#"<c r="E1"><v>1.5</v></c>"#.to_string(),
        ],
    );
    let workbook = XlsxBuilder::new()
        .sheet("S", data)
        .shared_items(
            "<si><t>pooled</t></si>\
             <si><r><t>rich </t></r><r><rPr><b/></rPr><t>text</t></r><rPh><t>ruby</t></rPh></si>",
        )
        .workbook();

    let sheet = workbook.get_worksheet(Some("S"), false).unwrap();
    assert_eq!(sheet.cell(0, 0).unwrap().as_deref(), Some("pooled"));
    assert_eq!(sheet.cell(1, 0).unwrap().as_deref(), Some("0"));
    assert_eq!(sheet.cell_at("C1").unwrap().as_deref(), Some("rich text"));
    assert_eq!(sheet.cell_at("$D$1").unwrap().as_deref(), Some("inline"));
    assert_eq!(sheet.cell_at("E1").unwrap().as_deref(), Some("1.5"));
    assert_eq!(sheet.cell(5, 0).unwrap(), None);
    assert_eq!(sheet.cell(0, 9).unwrap(), None);
}

#[test]
fn test_worksheet_names_and_ids() {
    let mut builder = XlsxBuilder::new();
    for i in 1..=10 {
        builder = builder.grid_sheet(&format!("S{i}"), &[&["x"]]);
    }
    let workbook = builder.workbook();

    let names = workbook.worksheet_names().unwrap();
    assert_eq!(names.first().map(String::as_str), Some("S1"));
    assert_eq!(names.last().map(String::as_str), Some("S10"));

    let ids = workbook.worksheet_ids();
    assert_eq!(ids[..3], ["sheet1", "sheet10", "sheet2"]);
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_case_insensitive_name_collision() {
    let workbook = XlsxBuilder::new()
        .grid_sheet("Data", &[&["Col"], &["first"]])
        .grid_sheet("DATA", &[&["Col"], &["second"]])
        .workbook();

    assert_eq!(workbook.worksheet_names().unwrap(), vec!["DATA"]);
    let sheet = workbook.worksheet("data").unwrap();
    let rows: Vec<KeyedRow> = sheet.rows().unwrap().collect();
    assert_eq!(rows, vec![pairs(&[("Col", "second")])]);
}

#[test]
fn test_worksheet_not_found() {
    let workbook = XlsxBuilder::new()
        .grid_sheet("Data", &[&["x"]])
        .orphan_sheet("Broken")
        .workbook();

    assert!(matches!(
        workbook.worksheet("Missing"),
        Err(Error::WorksheetNotFound(name)) if name == "Missing"
    ));
    assert!(matches!(
        workbook.worksheet("Broken"),
        Err(Error::WorksheetNotFound(_))
    ));
    assert!(workbook
        .get_worksheet_if_exists(Some("Missing"), true)
        .unwrap()
        .is_none());
    assert!(workbook
        .get_worksheet_if_exists(Some("data"), true)
        .unwrap()
        .is_some());
}

#[test]
fn test_default_sheet() {
    let workbook = XlsxBuilder::new()
        .grid_sheet("First", &[&["a"], &["1"]])
        .grid_sheet("Second", &[&["b"], &["2"]])
        .workbook();
    assert_eq!(workbook.first_sheet().unwrap().name(), "First");

    let empty = XlsxBuilder::new().without_manifest().workbook();
    assert!(empty.worksheet_names().unwrap().is_empty());
    assert!(matches!(
        empty.get_worksheet(None, true),
        Err(Error::WorksheetNotFound(name)) if name == "sheet1"
    ));
}

#[test]
fn test_not_a_package() {
    let err = Workbook::from_bytes(b"not a zip archive".to_vec()).unwrap_err();
    assert!(matches!(err, Error::PackageFormat(_)));

    let err = Workbook::from_reader(&b"PK\x03\x04 truncated"[..]).unwrap_err();
    assert!(matches!(err, Error::PackageFormat(_)));
}

#[test]
fn test_open_from_path() {
    let bytes = XlsxBuilder::new()
        .grid_sheet("People", &[&["Name"], &["Ann"]])
        .build();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let workbook = Workbook::open(file.path()).unwrap();
    assert_eq!(workbook.worksheet_names().unwrap(), vec!["People"]);

    let rows = sheetpivot::read_rows(file.path(), None).unwrap();
    assert_eq!(rows, vec![pairs(&[("Name", "Ann")])]);
}

#[test]
fn test_header_at_address() {
    let data = [
        row(1, &[text_cell("A1", "Report")]),
        row(3, &[text_cell("B3", "City"), text_cell("C3", "Count")]),
        row(4, &[text_cell("B4", "Rome"), text_cell("C4", "3")]),
    ]
    .concat();
    let workbook = XlsxBuilder::new().sheet("S", data).workbook();

    let mut sheet = workbook.get_worksheet(Some("S"), false).unwrap();
    sheet.set_header_address(Some("B3".parse().unwrap()));
    let rows: Vec<KeyedRow> = sheet.rows().unwrap().collect();
    assert_eq!(rows, vec![pairs(&[("City", "Rome"), ("Count", "3")])]);
}

#[derive(Debug, Default, PartialEq)]
struct Employee {
    name: String,
    age: u32,
    manager: Option<String>,
}

impl Entity for Employee {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("Name", |e: &mut Employee, v| {
                e.name = v.to_string();
                Ok(())
            }),
            Column::new("Age", |e: &mut Employee, v| {
                e.age = parse_field(v)?;
                Ok(())
            }),
            Column::new("Manager", |e: &mut Employee, v| {
                e.manager = Some(v.to_string());
                Ok(())
            }),
        ]
    }
}

#[test]
fn test_typed_projection() {
    let workbook = XlsxBuilder::new()
        .grid_sheet(
            "Staff",
            &[
                &["Name", "Age", "Manager", "Notes"],
                &["Ann", "41", "", "x"],
                &["", "", "", "note only"],
                &["Bo", "29", "Ann"],
            ],
        )
        .workbook();

    let sheet = workbook.worksheet("Staff").unwrap();
    let staff: Vec<Employee> = sheet
        .entities::<Employee>()
        .unwrap()
        .collect::<sheetpivot::Result<_>>()
        .unwrap();
    assert_eq!(
        staff,
        vec![
            Employee {
                name: "Ann".into(),
                age: 41,
                manager: None,
            },
            Employee {
                name: "Bo".into(),
                age: 29,
                manager: Some("Ann".into()),
            },
        ]
    );
}

#[test]
fn test_case_sensitive_projection_skips_other_spelling() {
    let workbook = XlsxBuilder::new()
        .grid_sheet("Staff", &[&["NAME", "Age"], &["Ann", "41"]])
        .workbook();

    let sheet = workbook.worksheet("Staff").unwrap();
    let staff: Vec<Employee> = sheet
        .entities::<Employee>()
        .unwrap()
        .collect::<sheetpivot::Result<_>>()
        .unwrap();
    assert_eq!(
        staff,
        vec![Employee {
            age: 41,
            ..Default::default()
        }]
    );
}
