//! Error types for the sheetpivot library.

use std::io;
use thiserror::Error;

/// Result type alias for sheetpivot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a readable OOXML package.
    #[error("Unable to open spreadsheet package: {0}")]
    PackageFormat(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// The worksheet name, its relationship, or its part could not be resolved.
    #[error("The worksheet named {0} does not exist")]
    WorksheetNotFound(String),

    /// Malformed cell address text.
    #[error("Invalid cell address: >>{0}<<")]
    InvalidAddress(String),

    /// The default table was requested on a workbook holding several tables.
    #[error("Multiple tables present, need to specify worksheet name")]
    AmbiguousDefaultTable,

    /// A pivot origin could not be parsed. Recovered by the table resolver.
    #[error("Malformed pivot origin: {0}")]
    MalformedPivotOrigin(String),

    /// A cell's text could not be assigned to a projected field.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::PackageFormat(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
