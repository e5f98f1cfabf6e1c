//! # Tabular Reader
//!
//! Turns a cutsheet file of unknown dialect into a [`Table`]: named columns and
//! string cells. Workbooks are read natively; delimited text goes through an
//! ordered chain of parsing strategies (see [`delimited`]). Either a whole table
//! comes back or a [`CutsheetError::ParseFailure`]; nothing partial.

pub(crate) mod delimited;
pub mod sniffer;
pub(crate) mod workbook;

use crate::config::ReaderOptions;
use crate::error::CutsheetError;
use crate::fields::{candidates, Field, Side};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;

/// Input families the reader understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SheetFormat {
    /// `.csv`: delimited text of any dialect
    Delimited,
    /// `.xlsx`
    Workbook,
}

impl SheetFormat {
    /// Format implied by the file extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, CutsheetError> {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Delimited),
            Some("xlsx") => Ok(Self::Workbook),
            _ => Err(CutsheetError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Rows of string cells under trimmed column names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    /// Column name → position of its first occurrence
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, trimming column names. Rows shorter than the header are
    /// padded with empty cells and cells beyond the header are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_owned()).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            index.entry(column.to_owned()).or_insert(position);
        }
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Table { columns, index, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }

    /// Blanks every cell whose trimmed text equals one of `nulls`.
    pub(crate) fn clear_nulls(&mut self, nulls: &[String]) {
        if nulls.is_empty() {
            return;
        }
        for cell in self.rows.iter_mut().flatten() {
            if nulls.iter().any(|null| null == cell.trim()) {
                cell.clear();
            }
        }
    }
}

/// Borrowed view of one table row.
#[derive(Copy, Clone, Debug)]
pub struct Row<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Raw cell under `column`, or `None` if the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let position = *self.table.index.get(column)?;
        self.cells.get(position).map(String::as_str)
    }

    /// Trimmed cell under `column`, treating blank cells as absent.
    pub fn value(&self, column: &str) -> Option<&'a str> {
        self.get(column).map(str::trim).filter(|value| !value.is_empty())
    }

    /// First non-blank value among `columns`, tried in order.
    pub fn first_value(&self, columns: &[&str]) -> Option<&'a str> {
        columns.iter().find_map(|column| self.value(column))
    }

    /// Value of an endpoint field, resolved through its header synonyms.
    pub fn field(&self, side: Side, field: Field) -> Option<&'a str> {
        self.first_value(candidates(side, field))
    }
}

/// Reads a cutsheet file into a [`Table`].
///
/// Workbooks are parsed natively with no further fallback. Delimited text is
/// parsed by the strategy chain in [`delimited`]. Every reader failure surfaces as
/// [`CutsheetError::ParseFailure`]; an unknown extension is
/// [`CutsheetError::UnsupportedFormat`].
pub fn read_table(path: &Path, options: &ReaderOptions) -> Result<Table, CutsheetError> {
    let format = SheetFormat::from_path(path)?;
    let mut table = match format {
        SheetFormat::Workbook => {
            workbook::read(path, options).map_err(|e| CutsheetError::parse_failure(path, e))?
        }
        SheetFormat::Delimited => delimited::read(path, options)?,
    };
    table.clear_nulls(&options.nulls);
    debug!(
        file = %path.display(),
        ?format,
        columns = table.columns().len(),
        rows = table.len(),
        "Read table"
    );
    Ok(table)
}
