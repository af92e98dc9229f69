//! A1-style cell address codec.
//!
//! Columns use bijective base-26 letters (`A`..`Z`, `AA`, `AB`, ...) with no
//! zero digit; rows are 1-based in text and 0-based internally.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

const RADIX: u32 = 26;

/// Last 0-based column of a worksheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_383;

/// Last 0-based row of a worksheet (row `1048576`).
pub const MAX_ROW: u32 = 1_048_575;

/// Convert a 0-based column index into its letters (`0` -> `A`, `26` -> `AA`).
pub fn column_name(column: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(column) + 1;
    while n > 0 {
        let rem = ((n - 1) % u64::from(RADIX)) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / u64::from(RADIX);
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters into a 0-based column index.
///
/// Letters are case-insensitive. Fails on an empty input, non-letters, or
/// columns past `XFD`.
pub fn column_index(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress(letters.to_string()));
    }
    let mut value: u64 = 0;
    for c in letters.bytes() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(letters.to_string()));
        }
        let digit = u64::from(c.to_ascii_uppercase() - b'A') + 1;
        value = value * u64::from(RADIX) + digit;
        if value > u64::from(MAX_COLUMN) + 1 {
            return Err(Error::InvalidAddress(letters.to_string()));
        }
    }
    Ok((value - 1) as u32)
}

/// The 1-based row text of a 0-based row index.
pub fn row_name(row: u32) -> String {
    (u64::from(row) + 1).to_string()
}

/// A1-style name of a 0-based (column, row) position.
pub fn cell_name(column: u32, row: u32) -> String {
    format!("{}{}", column_name(column), row_name(row))
}

/// Placeholder column name for a header cell without text (`26` -> `?AA`).
pub fn default_header(column: u32) -> String {
    format!("?{}", column_name(column))
}

/// Split an unqualified reference such as `B7` or `$B$7` into (column, row).
pub(crate) fn parse_reference(text: &str) -> Result<(u32, u32)> {
    let invalid = || Error::InvalidAddress(text.to_string());

    let cleaned: String = text.chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| !c.is_ascii_alphabetic())
        .ok_or_else(invalid)?;
    let (letters, digits) = cleaned.split_at(split);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let row: u64 = digits.parse().map_err(|_| invalid())?;
    if row == 0 || row > u64::from(MAX_ROW) + 1 {
        return Err(invalid());
    }
    let column = column_index(letters).map_err(|_| invalid())?;

    Ok((column, (row - 1) as u32))
}

fn needs_quotes(sheet: &str) -> bool {
    sheet.is_empty()
        || sheet.starts_with(|c: char| c.is_ascii_digit())
        || !sheet.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// A cell position with an optional sheet qualifier.
///
/// Column and row may be assigned independently; the text form is rebuilt
/// once both are known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CellAddress {
    sheet: Option<String>,
    column: Option<u32>,
    row: Option<u32>,
    address: Option<String>,
}

impl CellAddress {
    /// The top left cell, `A1`.
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Create an address from a 0-based (column, row) position.
    pub fn new(column: u32, row: u32) -> Self {
        Self {
            sheet: None,
            column: Some(column),
            row: Some(row),
            address: Some(cell_name(column, row)),
        }
    }

    /// Parse `B7`, `Sheet1!B7`, `'My Sheet'!$B$7` or a formula text `=Sheet1!B7`.
    ///
    /// # Example
    ///
    /// ```
    /// use sheetpivot::CellAddress;
    ///
    /// let address = CellAddress::parse("Data!$AB$10")?;
    /// assert_eq!(address.sheet(), Some("Data"));
    /// assert_eq!(address.column(), Some(27));
    /// assert_eq!(address.row(), Some(9));
    /// assert_eq!(address.to_string(), "Data!AB10");
    /// # Ok::<(), sheetpivot::Error>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidAddress(text.to_string()));
        }

        let (sheet, reference) = match trimmed.rsplit_once('!') {
            Some((sheet, reference)) => {
                let sheet = sheet.trim();
                let sheet = match sheet
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                {
                    Some(quoted) => quoted.replace("''", "'"),
                    None => sheet.to_string(),
                };
                if sheet.is_empty() {
                    return Err(Error::InvalidAddress(text.to_string()));
                }
                (Some(sheet), reference.trim())
            }
            None => (None, trimmed),
        };

        let (column, row) =
            parse_reference(reference).map_err(|_| Error::InvalidAddress(text.to_string()))?;

        Ok(Self {
            sheet,
            column: Some(column),
            row: Some(row),
            address: Some(cell_name(column, row)),
        })
    }

    /// Attach a sheet qualifier.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Sheet qualifier, if any.
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    /// 0-based column, if known.
    pub fn column(&self) -> Option<u32> {
        self.column
    }

    /// 0-based row, if known.
    pub fn row(&self) -> Option<u32> {
        self.row
    }

    /// Both coordinates as (column, row), once resolved.
    pub fn position(&self) -> Option<(u32, u32)> {
        Some((self.column?, self.row?))
    }

    /// Unqualified A1 text, once both coordinates are known.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// 1-based row text.
    pub fn row_name(&self) -> Option<String> {
        self.row.map(row_name)
    }

    /// Set the 0-based column.
    pub fn set_column(&mut self, column: u32) {
        self.column = Some(column);
        self.refresh();
    }

    /// Set the 0-based row.
    pub fn set_row(&mut self, row: u32) {
        self.row = Some(row);
        self.refresh();
    }

    /// A copy moved by the given offsets; `None` if it would leave the sheet
    /// or the address is not fully resolved.
    pub fn shifted(&self, columns: i64, rows: i64) -> Option<Self> {
        let (column, row) = self.position()?;
        let column = u32::try_from(i64::from(column) + columns).ok()?;
        let row = u32::try_from(i64::from(row) + rows).ok()?;
        let mut moved = Self::new(column, row);
        moved.sheet = self.sheet.clone();
        Some(moved)
    }

    fn refresh(&mut self) {
        self.address = self.position().map(|(c, r)| cell_name(c, r));
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = self.address.as_deref().unwrap_or("");
        match self.sheet.as_deref() {
            Some(sheet) if needs_quotes(sheet) => {
                write!(f, "'{}'!{}", sheet.replace('\'', "''"), address)
            }
            Some(sheet) => write!(f, "{}!{}", sheet, address),
            None => f.write_str(address),
        }
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
