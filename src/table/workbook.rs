//! Workbook strategy: one worksheet, first non-blank row as header.

use crate::config::ReaderOptions;
use crate::error::CutsheetError;
use crate::spreadsheet;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::table::Table;
use std::path::Path;
use tracing::debug;

pub(crate) fn read(path: &Path, options: &ReaderOptions) -> Result<Table, CutsheetError> {
    let mut workbook = spreadsheet::open(path)?;
    read_workbook(workbook.as_mut(), &options.criteria()?)
}

pub(crate) fn read_workbook(workbook: &mut dyn Spreadsheet, criteria: &Criteria) -> Result<Table, CutsheetError> {
    debug!(file = %workbook.name(), sheets = ?workbook.sheet_names(), "Opened workbook");
    let shared_strings = workbook.load_shared_strings()?;
    let sheet = workbook.read_sheet(criteria)?;
    debug!(file = %sheet.file_name, sheet = %sheet.name, cells = sheet.cells.len(), "Read worksheet");
    from_sheet(&sheet, &shared_strings)
}

/// Renders the cells of `sheet` as a table. Blank rows are dropped and blank
/// header cells are named after their position.
fn from_sheet(sheet: &Sheet, shared_strings: &[String]) -> Result<Table, CutsheetError> {
    if sheet.is_empty() {
        return Ok(Table::default());
    }
    let mut rows = Vec::new();
    for record in sheet.records() {
        let row = record
            .into_iter()
            .map(|cell| cell.map_or_else(|| Ok(String::new()), |cell| cell.to_text(shared_strings)))
            .collect::<Result<Vec<String>, CutsheetError>>()?;
        if row.iter().any(|value| !value.trim().is_empty()) {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        return Ok(Table::default());
    }
    let header = rows
        .remove(0)
        .into_iter()
        .enumerate()
        .map(|(i, name)| if name.trim().is_empty() { format!("Unnamed: {i}") } else { name })
        .collect();
    Ok(Table::new(header, rows))
}
