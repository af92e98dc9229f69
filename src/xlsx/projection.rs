//! Typed projection of worksheet rows onto records.
//!
//! A record type declares a static column table: which header name feeds
//! which field, whether the cached value or the formula text is read, and
//! whether the header name is matched case-sensitively.

use crate::error::{Error, Result};
use std::fmt;

/// Which text of a cell feeds a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    /// The cached (resolved) value
    #[default]
    Data,
    /// The formula text
    Formula,
}

/// Field setter receiving the cell text.
pub type Assign<T> = fn(&mut T, &str) -> Result<()>;

/// One entry of a record's column table.
pub struct Column<T> {
    /// Header name the field is bound to
    pub name: String,
    /// Cell text to read
    pub content_type: ContentType,
    /// Match the header name case-sensitively
    pub case_sensitive: bool,
    assign: Assign<T>,
}

impl<T> Column<T> {
    /// Bind a header name to a field setter, reading the cached value with a
    /// case-sensitive match.
    pub fn new(name: impl Into<String>, assign: Assign<T>) -> Self {
        Self {
            name: name.into(),
            content_type: ContentType::Data,
            case_sensitive: true,
            assign,
        }
    }

    /// Read the formula text instead of the cached value.
    pub fn formula(mut self) -> Self {
        self.content_type = ContentType::Formula;
        self
    }

    /// Match the header name ignoring case.
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Assign a cell text to the field.
    pub fn assign(&self, target: &mut T, value: &str) -> Result<()> {
        (self.assign)(target, value)
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

/// A record that worksheet rows can be projected onto.
///
/// # Example
///
/// ```
/// use sheetpivot::{Column, Entity};
///
/// #[derive(Default)]
/// struct Person {
///     first: String,
///     age: u32,
/// }
///
/// impl Entity for Person {
///     fn columns() -> Vec<Column<Self>> {
///         vec![
///             Column::new("First Name", |p: &mut Person, v| {
///                 p.first = v.to_string();
///                 Ok(())
///             }),
///             Column::new("Age", |p: &mut Person, v| {
///                 p.age = sheetpivot::xlsx::parse_field(v)?;
///                 Ok(())
///             }),
///         ]
///     }
/// }
/// ```
pub trait Entity: Default {
    /// The column table of this record type.
    fn columns() -> Vec<Column<Self>>;
}

/// Lookup over a record's column table.
///
/// Matching ignores case for every column as soon as one column asks for it.
/// When two entries share a name the later one wins.
#[derive(Debug)]
pub struct ColumnMap<T> {
    columns: Vec<Column<T>>,
    ignore_case: bool,
}

impl<T: Entity> ColumnMap<T> {
    /// Build the map of a record type.
    pub fn of() -> Self {
        Self::new(T::columns())
    }
}

impl<T> ColumnMap<T> {
    /// Build a map from a column table.
    pub fn new(columns: Vec<Column<T>>) -> Self {
        let ignore_case = columns.iter().any(|c| !c.case_sensitive);
        Self {
            columns,
            ignore_case,
        }
    }

    /// Whether names are matched ignoring case.
    pub fn ignores_case(&self) -> bool {
        self.ignore_case
    }

    /// The column bound to a header name.
    pub fn find(&self, name: Option<&str>) -> Option<&Column<T>> {
        let name = name.filter(|n| !n.is_empty())?;
        self.columns.iter().rev().find(|c| {
            if self.ignore_case {
                c.name.to_lowercase() == name.to_lowercase()
            } else {
                c.name == name
            }
        })
    }

    /// Content type for a header name, `Data` when unbound.
    pub fn content_type(&self, name: Option<&str>) -> ContentType {
        self.find(name)
            .map(|c| c.content_type)
            .unwrap_or_default()
    }
}

/// Parse a cell text into a field type, mapping failures to `InvalidData`.
pub fn parse_field<F>(value: &str) -> Result<F>
where
    F: std::str::FromStr,
    F::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidData(format!("{value:?}: {e}")))
}

/// Parse a cell text as a boolean (`true`/`false`, `1`/`0`, ignoring case).
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidData(format!("{value:?} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug)]
    struct Probe {
        name: String,
        origin: String,
    }

    fn columns(insensitive: bool) -> Vec<Column<Probe>> {
        let name = Column::new("Name", |p: &mut Probe, v| {
            p.name = v.to_string();
            Ok(())
        });
        let name = if insensitive { name.case_insensitive() } else { name };
        vec![
            name,
            Column::new("Origin", |p: &mut Probe, v| {
                p.origin = v.to_string();
                Ok(())
            })
            .formula(),
        ]
    }

    #[test]
    fn test_case_sensitive_lookup() {
        let map = ColumnMap::new(columns(false));
        assert!(!map.ignores_case());
        assert!(map.find(Some("Name")).is_some());
        assert!(map.find(Some("name")).is_none());
        assert!(map.find(None).is_none());
        assert!(map.find(Some("")).is_none());
    }

    #[test]
    fn test_insensitivity_is_global() {
        let map = ColumnMap::new(columns(true));
        assert!(map.ignores_case());
        assert!(map.find(Some("NAME")).is_some());
        // Origin itself is case-sensitive, but one insensitive column flips the map
        assert_eq!(map.content_type(Some("origin")), ContentType::Formula);
        assert_eq!(map.content_type(Some("other")), ContentType::Data);
    }

    #[test]
    fn test_assign() {
        let map = ColumnMap::new(columns(false));
        let mut probe = Probe::default();
        map.find(Some("Name")).unwrap().assign(&mut probe, "Ann").unwrap();
        map.find(Some("Origin")).unwrap().assign(&mut probe, "Data!B2").unwrap();
        assert_eq!(probe.name, "Ann");
        assert_eq!(probe.origin, "Data!B2");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let map = ColumnMap::new(vec![
            Column::new("Key", |p: &mut Probe, v| {
                p.name = v.to_string();
                Ok(())
            }),
            Column::new("Key", |p: &mut Probe, v| {
                p.origin = v.to_string();
                Ok(())
            }),
        ]);
        let mut probe = Probe::default();
        map.find(Some("Key")).unwrap().assign(&mut probe, "x").unwrap();
        assert_eq!(probe.name, "");
        assert_eq!(probe.origin, "x");
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_field::<u32>(" 42 ").unwrap(), 42);
        assert!(matches!(parse_field::<u32>("x"), Err(Error::InvalidData(_))));
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
