//! Workbook manifest: sheet names, ids and relationship ids.

use crate::container::{attr_value, OoxmlContainer};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Path of the workbook manifest part.
pub const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetEntry {
    /// Display name of the sheet
    pub name: String,
    /// Numeric `sheetId`
    pub sheet_id: u32,
    /// Relationship id pointing at the worksheet part
    pub rel_id: String,
}

/// Sheet entries keyed case-insensitively by name.
///
/// Entries keep manifest order. A later entry whose name collides with an
/// earlier one replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct SheetCatalog {
    entries: Vec<SheetEntry>,
    by_name: HashMap<String, usize>,
}

impl SheetCatalog {
    /// Build a catalog from entries in manifest order.
    pub fn from_entries(entries: impl IntoIterator<Item = SheetEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    /// Read the catalog from the package manifest. A missing manifest yields
    /// an empty catalog.
    pub fn read(container: &OoxmlContainer) -> Result<Self> {
        match container.read_xml(WORKBOOK_PART)? {
            Some(xml) => Ok(Self::from_entries(Self::parse_workbook(&xml)?)),
            None => {
                log::debug!("package has no {WORKBOOK_PART}");
                Ok(Self::default())
            }
        }
    }

    /// Parse workbook.xml for sheet info.
    fn parse_workbook(xml: &str) -> Result<Vec<SheetEntry>> {
        let mut sheets = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e))
                | Ok(quick_xml::events::Event::Start(e)) => {
                    if e.local_name().as_ref() == b"sheet" {
                        let mut name = String::new();
                        let mut sheet_id = 0;
                        let mut rel_id = String::new();

                        for attr in e.attributes().flatten() {
                            match attr.key.local_name().as_ref() {
                                b"name" => name = attr_value(&attr),
                                b"sheetId" => {
                                    sheet_id = attr_value(&attr).trim().parse().unwrap_or(0);
                                }
                                // r:id, whatever the relationship prefix is
                                b"id" if attr.key.prefix().is_some() => {
                                    rel_id = attr_value(&attr);
                                }
                                _ => {}
                            }
                        }

                        if !name.is_empty() {
                            sheets.push(SheetEntry {
                                name,
                                sheet_id,
                                rel_id,
                            });
                        }
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    fn insert(&mut self, entry: SheetEntry) {
        let key = entry.name.to_lowercase();
        match self.by_name.get(&key) {
            Some(&index) => self.entries[index] = entry,
            None => {
                self.by_name.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Look up an entry by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&SheetEntry> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&index| &self.entries[index])
    }

    /// Whether a sheet with this name exists, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_lowercase())
    }

    /// Entries in manifest order.
    pub fn entries(&self) -> &[SheetEntry] {
        &self.entries
    }

    /// Sheet names in manifest order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
