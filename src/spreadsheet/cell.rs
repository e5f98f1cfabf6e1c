use crate::error::CutsheetError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;

/// Epoch that serial date numbers count from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DateSystem {
    /// Default Windows epoch, including the Lotus 1-2-3 leap year bug
    Epoch1900,
    /// Classic Mac epoch, enabled by `workbookPr date1904="1"`
    Epoch1904,
}

impl DateSystem {
    pub(crate) fn from_flag(is_1904: bool) -> Self {
        if is_1904 {
            Self::Epoch1904
        } else {
            Self::Epoch1900
        }
    }
}

/// Storage type of a worksheet cell.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    Boolean,
    Number,
    /// Serial number formatted as a date
    Date(DateSystem),
    /// Serial number formatted as date and time
    DateTime(DateSystem),
    /// Serial number formatted as a time of day
    Time,
    /// ISO 8601 text (`t="d"`)
    IsoDateTime,
    InlineString,
    /// Index into the shared strings part
    SharedString,
    Error,
}

impl CellType {
    /// Cell type implied by one of the built-in number format ids.
    pub(crate) fn from_builtin_format_id(id: &str, system: DateSystem) -> Option<Self> {
        match id {
            "22" => Some(Self::DateTime(system)),
            "14" | "15" | "16" | "17" => Some(Self::Date(system)),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::Time),
            _ => None,
        }
    }

    /// Cell type implied by a custom format code such as `yyyy-mm-dd` or `0.00`.
    ///
    /// Quoted literals, escaped characters and bracketed sections (`[Red]`,
    /// `[$-409]`) are skipped before looking for date and time tokens.
    pub(crate) fn from_custom_format(format: &str, system: DateSystem) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut has_date = false;
        let mut has_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,
                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,
                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),
                'Y' | 'y' | 'D' | 'd' => has_date = true,
                'H' | 'h' | 'S' | 's' => has_time = true,
                _ => (),
            }
        }

        match (has_date, has_time) {
            (true, true) => Self::DateTime(system),
            (true, false) => Self::Date(system),
            (false, true) => Self::Time,
            (false, false) => Self::Number,
        }
    }
}

/// A single non-empty worksheet cell.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Raw value as stored in the worksheet part
    pub(crate) value: String,
}

impl Cell {
    /// A1-style reference of this cell.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Renders the cell as the text a cutsheet reader expects to see.
    ///
    /// Shared string indexes are resolved against `shared_strings`, integral
    /// numbers lose their fractional part, and date-formatted serials become ISO
    /// dates. Error cells render as empty.
    pub(crate) fn to_text(&self, shared_strings: &[String]) -> Result<String, CutsheetError> {
        let text = match self.kind {
            CellType::Empty | CellType::Error => String::new(),
            CellType::Boolean => if self.value == "1" { "true" } else { "false" }.to_owned(),
            CellType::SharedString => {
                let index = self.value.trim().parse::<usize>()?;
                shared_strings
                    .get(index)
                    .cloned()
                    .ok_or_else(|| self.invalid("shared string index out of range"))?
            }
            CellType::InlineString => self.value.to_owned(),
            CellType::Number => format_number(&self.value),
            CellType::Date(system) => self.serial_date(system)?.format("%Y-%m-%d").to_string(),
            CellType::DateTime(system) => {
                let date = self.serial_date(system)?;
                format!("{} {}", date.format("%Y-%m-%d"), self.serial_time()?)
            }
            CellType::Time => self.serial_time()?,
            CellType::IsoDateTime => self.value.replace('T', " "),
        };
        Ok(text)
    }

    fn serial(&self) -> Result<f64, CutsheetError> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|_| self.invalid("not a serial number").into())
    }

    fn serial_date(&self, system: DateSystem) -> Result<NaiveDate, CutsheetError> {
        let days = self.serial()?.trunc() as i64;
        let offset = match system {
            DateSystem::Epoch1904 => 1462,
            // Serial 60 is the phantom 1900-02-29
            DateSystem::Epoch1900 if days < 60 => 1,
            DateSystem::Epoch1900 => 0,
        };
        NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|epoch| epoch.checked_add_signed(Duration::days(days + offset)))
            .ok_or_else(|| self.invalid("date out of range").into())
    }

    fn serial_time(&self) -> Result<String, CutsheetError> {
        let fraction = self.serial()?.fract().abs();
        let mut seconds = (fraction * 86_400f64).round() as i64;
        let hours = seconds / 3600;
        seconds %= 3600;
        let minutes = seconds / 60;
        seconds %= 60;
        Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
    }

    fn invalid(&self, message: &str) -> SpreadsheetError {
        SpreadsheetError::CellValue {
            reference: self.reference(),
            value: self.value.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// `42` stays `42`, `42.0` becomes `42`, `1.5` stays `1.5`, non-numbers pass through.
fn format_number(value: &str) -> String {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 => {
            format!("{}", number as i64)
        }
        Ok(number) if number.is_finite() => number.to_string(),
        _ => value.to_owned(),
    }
}
