//! Delimited-text strategy chain.
//!
//! Strategies run in order and the first one that produces a table wins:
//!
//! 1. comma, first row as header
//! 2. tab, semicolon, pipe, colon, first row as header
//! 3. dialect and header presence sniffed from a bounded prefix of the text
//!
//! A fixed-delimiter parse is rejected when it yields a single column, or when
//! the first row scores as data rather than a header. Both are the silent
//! failure modes of guessing wrong. A first row holding a known cutsheet column
//! name is always taken as the header. The sniffed strategy accepts any shape.

use crate::config::ReaderOptions;
use crate::error::CutsheetError;
use crate::fields::names_known_header;
use crate::helpers::text::{decode, prefix};
use crate::table::sniffer::{self, Dialect, SniffError};
use crate::table::Table;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parsing strategies in the order they are tried.
pub(crate) const STRATEGIES: [Strategy; 6] = [
    Strategy::Fixed(b','),
    Strategy::Fixed(b'\t'),
    Strategy::Fixed(b';'),
    Strategy::Fixed(b'|'),
    Strategy::Fixed(b':'),
    Strategy::Sniffed,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Known delimiter, header on the first row
    Fixed(u8),
    /// Dialect and header detected from a sample
    Sniffed,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Fixed(delimiter) => write!(f, "delimiter {:?}", *delimiter as char),
            Strategy::Sniffed => write!(f, "sniffed dialect"),
        }
    }
}

impl Strategy {
    /// `Ok(None)` means the strategy ran but its result was not plausible.
    pub(crate) fn parse(&self, text: &str, options: &ReaderOptions) -> Result<Option<Table>, CutsheetError> {
        match *self {
            Strategy::Fixed(delimiter) => parse_fixed(text, Dialect::new(delimiter)),
            Strategy::Sniffed => parse_sniffed(text, options.sniff_bytes).map(Some),
        }
    }
}

/// Reads a delimited file through [`STRATEGIES`].
pub(crate) fn read(path: &Path, options: &ReaderOptions) -> Result<Table, CutsheetError> {
    let bytes = fs::read(path).map_err(|e| CutsheetError::parse_failure(path, e))?;
    let text = decode(&bytes);
    let mut last_error = None::<CutsheetError>;
    for strategy in STRATEGIES {
        match strategy.parse(&text, options) {
            Ok(Some(table)) => {
                debug!(file = %path.display(), %strategy, "Parsed delimited text");
                return Ok(table);
            }
            Ok(None) => debug!(file = %path.display(), %strategy, "Strategy rejected"),
            Err(error) => {
                debug!(file = %path.display(), %strategy, %error, "Strategy failed");
                last_error = Some(error);
            }
        }
    }
    let reason = last_error.map_or_else(|| "no strategy produced a table".to_owned(), |e| e.to_string());
    Err(CutsheetError::parse_failure(path, reason))
}

fn parse_fixed(text: &str, dialect: Dialect) -> Result<Option<Table>, CutsheetError> {
    let mut records = parse_records(text, dialect)?;
    if records.is_empty() {
        return Ok(None);
    }
    let header = records.remove(0);
    if header.len() <= 1 {
        return Ok(None);
    }
    if !names_known_header(&header) && sniffer::header_score(&header, &records) < 0 {
        return Ok(None);
    }
    check_widths(header.len(), &records)?;
    Ok(Some(Table::new(header, records)))
}

fn parse_sniffed(text: &str, sniff_bytes: usize) -> Result<Table, CutsheetError> {
    let sample = prefix(text, sniff_bytes);
    let truncated = sample.len() < text.len();
    let dialect = sniffer::sniff(sample, truncated)?;

    let mut sample_records = parse_records(sample, dialect)?;
    if truncated && sample_records.len() > 1 {
        sample_records.pop();
    }
    let has_header = match sample_records.split_first() {
        Some((first, rest)) => names_known_header(first) || sniffer::has_header(first, rest),
        None => return Err(SniffError::EmptySample.into()),
    };

    let mut records = parse_records(text, dialect)?;
    if records.is_empty() {
        return Err(SniffError::EmptySample.into());
    }
    let header = if has_header {
        records.remove(0)
    } else {
        (0..records[0].len()).map(|i| format!("col{i}")).collect()
    };
    debug!(
        delimiter = ?(dialect.delimiter as char),
        quote = ?(dialect.quote as char),
        has_header,
        "Sniffed dialect"
    );
    check_widths(header.len(), &records)?;
    Ok(Table::new(header, records))
}

/// All non-blank records of `text`, fields unmodified.
fn parse_records(text: &str, dialect: Dialect) -> Result<Vec<Vec<String>>, CutsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        records.push(record.iter().map(str::to_owned).collect());
    }
    Ok(records)
}

/// Rows may be shorter than the header, never longer.
fn check_widths(width: usize, records: &[Vec<String>]) -> Result<(), CutsheetError> {
    match records.iter().position(|record| record.len() > width) {
        Some(index) => Err(CutsheetError::RaggedRecord {
            record: index + 1,
            expected: width,
            found: records[index].len(),
        }),
        None => Ok(()),
    }
}
