//! Runtime settings shared by the library and the command line.

use crate::error::CutsheetError;
use crate::spreadsheet::criteria::Criteria;
use glob::Pattern;

/// Bytes of delimited text examined when sniffing a dialect.
pub const SNIFF_SAMPLE_BYTES: usize = 4096;
/// Directory scanned by batch mode when none is given.
pub const DEFAULT_INPUT_DIR: &str = ".";
/// Directory receiving batch outputs when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "./output_combined";

/// Knobs of the Tabular Reader.
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// Upper bound of the sniffing sample, in bytes
    pub sniff_bytes: usize,
    /// Glob selecting the worksheet of a workbook; the first worksheet when `None`
    pub sheet: Option<String>,
    /// Cell texts treated as missing values, compared after trimming
    pub nulls: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            sniff_bytes: SNIFF_SAMPLE_BYTES,
            sheet: None,
            nulls: Vec::new(),
        }
    }
}

impl ReaderOptions {
    pub(crate) fn criteria(&self) -> Result<Criteria, CutsheetError> {
        let sheet_name_pattern = self.sheet.as_deref().map(Pattern::new).transpose()?;
        Ok(Criteria { sheet_name_pattern })
    }
}
