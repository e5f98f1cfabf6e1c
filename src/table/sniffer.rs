//! Dialect sniffing for delimited text.
//!
//! Works on a bounded sample. The quote character comes from quoted-field
//! patterns. The delimiter is the character whose per-line frequency is the most
//! consistent. Header presence is decided by comparing the first row against
//! per-column type and length profiles of the rows after it.

use regex::Regex;
use std::collections::BTreeMap;
use std::collections::HashMap;
use thiserror::Error;

/// Delimiters that win ties, in order.
const PREFERRED: [u8; 6] = [b',', b'\t', b';', b' ', b':', b'|'];
/// Rows after the first that feed the header vote.
const HEADER_PROBE_ROWS: usize = 20;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SniffError {
    #[error("Sample is empty")]
    EmptySample,

    #[error("Could not determine delimiter")]
    NoDelimiter,
}

/// Field delimiter and quote character of a delimited file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Dialect {
    pub const fn new(delimiter: u8) -> Self {
        Dialect { delimiter, quote: b'"' }
    }
}

/// Guesses the dialect of `sample`.
///
/// `truncated` says whether the sample was cut from a longer text, in which
/// case its last line is partial and left out of the frequency count.
pub fn sniff(sample: &str, truncated: bool) -> Result<Dialect, SniffError> {
    let mut lines: Vec<&str> = sample.lines().collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    lines.retain(|line| !line.trim().is_empty());
    if lines.is_empty() {
        return Err(SniffError::EmptySample);
    }

    let (quote, quoted_delimiter) = guess_quote(sample);
    let delimiter = match quoted_delimiter {
        Some(delimiter) => delimiter,
        None => guess_delimiter(&lines, quote).ok_or(SniffError::NoDelimiter)?,
    };
    Ok(Dialect { delimiter, quote })
}

/// Picks the quote character with the most quoted fields, and the delimiter
/// seen most often right next to those fields.
fn guess_quote(sample: &str) -> (u8, Option<u8>) {
    let mut best: Option<(usize, u8, Option<u8>)> = None;
    for quote in ['"', '\''] {
        // Without backreferences each quote character gets its own pattern
        let pattern = format!(r#"(?m)(^|[^\w\n"'])( ?){quote}[^{quote}\n]*{quote}([^\w\n"']|$)"#);
        let regex = Regex::new(&pattern).expect("Hardcode regex pattern");
        let mut count = 0usize;
        let mut delimiters = HashMap::<char, usize>::new();
        for captures in regex.captures_iter(sample) {
            count += 1;
            for group in [1, 3] {
                if let Some(delimiter) = captures.get(group).and_then(|m| m.as_str().chars().next()) {
                    *delimiters.entry(delimiter).or_default() += 1;
                }
            }
        }
        if count > 0 && best.map_or(true, |(best_count, _, _)| count > best_count) {
            let delimiter = delimiters
                .into_iter()
                .filter(|(delimiter, _)| delimiter.is_ascii())
                .max_by_key(|(delimiter, seen)| (*seen, preference(*delimiter as u8)))
                .map(|(delimiter, _)| delimiter as u8);
            best = Some((count, quote as u8, delimiter));
        }
    }
    match best {
        Some((_, quote, delimiter)) => (quote, delimiter),
        None => (b'"', None),
    }
}

/// Higher is more preferred; characters outside [`PREFERRED`] rank lowest.
fn preference(delimiter: u8) -> usize {
    PREFERRED
        .iter()
        .position(|preferred| *preferred == delimiter)
        .map_or(0, |position| PREFERRED.len() - position)
}

/// Characters counted as delimiter candidates.
fn is_candidate(byte: u8) -> bool {
    byte.is_ascii() && !byte.is_ascii_alphanumeric() && !matches!(byte, b'"' | b'\'' | b'\r' | b'\n')
}

/// Frequency-consistency delimiter guess over whole lines.
///
/// For every candidate the most common per-line count (its mode) is found and
/// discounted by the lines that disagree. Candidates whose mode is non-zero and
/// agrees on at least `consistency` of the lines qualify; the threshold starts
/// at 1.0 and is relaxed down to 0.9.
fn guess_delimiter(lines: &[&str], quote: u8) -> Option<u8> {
    // candidate → (count in line → number of lines)
    let mut frequencies = BTreeMap::<u8, HashMap<usize, usize>>::new();
    for line in lines {
        let mut counts = BTreeMap::<u8, usize>::new();
        let mut in_quotes = false;
        for byte in line.bytes() {
            if byte == quote {
                in_quotes = !in_quotes;
            } else if !in_quotes && is_candidate(byte) {
                *counts.entry(byte).or_default() += 1;
            }
        }
        for (byte, count) in counts {
            *frequencies.entry(byte).or_default().entry(count).or_default() += 1;
        }
    }

    let total = lines.len();
    let modes: Vec<(u8, usize, usize)> = frequencies
        .into_iter()
        .filter_map(|(byte, histogram)| {
            let lines_with = histogram.values().sum::<usize>();
            let mut histogram: Vec<(usize, usize)> = histogram.into_iter().collect();
            // Lines where the candidate never appears count as frequency zero
            if lines_with < total {
                histogram.push((0, total - lines_with));
            }
            let (mode, agreeing) = histogram
                .iter()
                .copied()
                .max_by_key(|(frequency, lines)| (*lines, *frequency))?;
            let disagreeing = total - agreeing;
            Some((byte, mode, agreeing.saturating_sub(disagreeing)))
        })
        .filter(|(_, mode, score)| *mode > 0 && *score > 0)
        .collect();

    let mut consistency = 1.0f64;
    while consistency >= 0.9 - f64::EPSILON {
        let qualified: Vec<&(u8, usize, usize)> = modes
            .iter()
            .filter(|(_, _, score)| *score as f64 / total as f64 >= consistency)
            .collect();
        if !qualified.is_empty() {
            return qualified
                .into_iter()
                .max_by_key(|(byte, mode, score)| (preference(*byte), *score, *mode))
                .map(|(byte, _, _)| *byte);
        }
        consistency -= 0.01;
    }
    None
}

/// Shape of the values in one column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Profile {
    Numeric,
    Length(usize),
}

impl Profile {
    fn of(value: &str) -> Self {
        if value.trim().parse::<f64>().is_ok() {
            Profile::Numeric
        } else {
            Profile::Length(value.chars().count())
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    Unset,
    Fixed(Profile),
    Mixed,
}

/// Vote on whether `header` is a header row for `rows`.
///
/// Each column whose following values share one profile (all numeric, or all
/// the same length) votes +1 if the header cell breaks that profile and -1 if it
/// fits. Columns with no usable rows vote +1; mixed columns abstain. Rows with a
/// different width than `header` are ignored, and at most 20 rows are examined.
pub fn header_score(header: &[String], rows: &[Vec<String>]) -> i32 {
    let mut slots = vec![Slot::Unset; header.len()];
    for row in rows.iter().take(HEADER_PROBE_ROWS) {
        if row.len() != header.len() {
            continue;
        }
        for (slot, value) in slots.iter_mut().zip(row) {
            let profile = Profile::of(value);
            *slot = match *slot {
                Slot::Unset => Slot::Fixed(profile),
                Slot::Fixed(existing) if existing == profile => Slot::Fixed(existing),
                _ => Slot::Mixed,
            };
        }
    }

    slots
        .iter()
        .zip(header)
        .map(|(slot, cell)| match slot {
            Slot::Unset => 1,
            Slot::Mixed => 0,
            Slot::Fixed(profile) if Profile::of(cell) == *profile => -1,
            Slot::Fixed(_) => 1,
        })
        .sum()
}

/// `true` when [`header_score`] is positive.
pub fn has_header(header: &[String], rows: &[Vec<String>]) -> bool {
    header_score(header, rows) > 0
}
