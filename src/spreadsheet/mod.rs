//! # Spreadsheet Module
//!
//! Native reading of Office Open XML workbooks (`.xlsx`) straight from
//! the ZIP container: workbook relationships, shared strings, number formats and
//! worksheet cells are streamed with an XML pull parser. Only what a cutsheet
//! needs is kept: one worksheet, rendered as text.

pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

use crate::error::CutsheetError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Cannot detect spreadsheet format for '{0}'")]
    Format(String),

    #[error("Missing part '{0}' in workbook")]
    MissingPart(String),

    #[error("Workbook '{0}' contains no worksheets")]
    NoWorksheets(String),

    #[error("No worksheet in '{0}' matches the requested name")]
    SheetNotFound(String),

    #[error("Invalid cell value '{value}' at {reference}: {message}")]
    CellValue {
        reference: String,
        value: String,
        message: String,
    },
}

/// A workbook that can produce one worksheet worth of cells.
pub(crate) trait Spreadsheet {
    /// File name this spreadsheet was opened from
    fn name(&self) -> String;

    /// Names of all worksheets in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Loads the whole shared strings table (empty when the part is absent)
    fn load_shared_strings(&mut self) -> Result<Vec<String>, CutsheetError>;

    /// Reads the first worksheet accepted by `criteria`
    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, CutsheetError>;
}

/// Opens a workbook, choosing the reader from the file extension.
pub(crate) fn open(path: &Path) -> Result<Box<dyn Spreadsheet>, CutsheetError> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::Format(path.display().to_string()))?,
    }
}
