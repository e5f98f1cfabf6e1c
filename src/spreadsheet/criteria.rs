use glob::Pattern;

/// Which worksheet of a workbook to read.
#[derive(Clone, Debug, Default)]
pub(crate) struct Criteria {
    /// Worksheet name pattern; `None` selects the first worksheet.
    pub(crate) sheet_name_pattern: Option<Pattern>,
}

impl Criteria {
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        self.sheet_name_pattern
            .as_ref()
            .map_or(true, |pattern| pattern.matches(sheet_name))
    }
}
