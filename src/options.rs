//! Reader options configuration.

/// Default reserved prefix of pivot marker sheets.
pub const DEFAULT_MARKER_PREFIX: &str = "_pivot";

/// Default measure column name.
pub const DEFAULT_MEASURE: &str = "Value";

/// Options for reading pivot annotated workbooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Reserved, case-insensitive prefix of the marker sheets
    pub marker_prefix: String,

    /// Measure column name used when a table's metadata names none
    pub default_measure: String,

    /// Trim surrounding whitespace from header texts
    pub trim_header: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            default_measure: DEFAULT_MEASURE.to_string(),
            trim_header: true,
        }
    }
}

impl ReaderOptions {
    /// Create new reader options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reserved marker prefix. Stored lowercase; blank input keeps the default.
    pub fn with_marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            self.marker_prefix = prefix.to_lowercase();
        }
        self
    }

    /// Set the default measure column name.
    pub fn with_default_measure(mut self, measure: impl Into<String>) -> Self {
        self.default_measure = measure.into();
        self
    }

    /// Enable or disable header trimming.
    pub fn with_trim_header(mut self, trim: bool) -> Self {
        self.trim_header = trim;
        self
    }
}
