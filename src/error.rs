use std::path::Path;
use thiserror::Error;

/// Main error type for the cutsheet pipeline.
/// Aggregates errors from the standard library, format dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum CutsheetError {
    #[error("{0}")]
    WithContext(String),

    /// Extension other than `.csv` / `.xlsx`
    #[error("Unsupported file format '{path}': only .csv and .xlsx are accepted")]
    UnsupportedFormat { path: String },

    /// Every reader strategy was exhausted
    #[error("Failed to parse '{path}': {reason}")]
    ParseFailure { path: String, reason: String },

    /// Delimited record wider than its header
    #[error("Expected {expected} fields in record {record}, saw {found}")]
    RaggedRecord { record: usize, expected: usize, found: usize },

    // Standard library errors
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{0}")]
    Glob(#[from] glob::GlobError),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelper(#[from] crate::helpers::xml::XmlError),

    // Reader module errors
    #[error("{0}")]
    Spreadsheet(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    Sniff(#[from] crate::table::sniffer::SniffError),
}

impl CutsheetError {
    /// Builds a [`CutsheetError::ParseFailure`] for the given input path.
    pub(crate) fn parse_failure(path: &Path, reason: impl ToString) -> Self {
        CutsheetError::ParseFailure {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, CutsheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| CutsheetError::WithContext(format!("{}: {}", message, e)))
    }
}
