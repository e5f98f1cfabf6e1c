use crate::spreadsheet::cell::Cell;

/// Cells read from one worksheet, together with the column bounds of the used area.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Worksheet name
    pub(crate) name: String,
    /// Non-empty cells in row-major order once [`Sheet::finish`] has run
    pub(crate) cells: Vec<Cell>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, col: usize) {
        self.col_lower_bound = Some(self.col_lower_bound.map_or(col, |lower| lower.min(col)));
        self.col_upper_bound = Some(self.col_upper_bound.map_or(col, |upper| upper.max(col)));
    }

    /// Restores row-major order; writers occasionally emit cells out of order.
    pub(crate) fn finish(&mut self) {
        self.cells.sort_by_key(|cell| (cell.row, cell.col));
    }

    /// Rows that contain at least one cell, each spanning the full column bounds.
    /// Positions without a cell are `None`.
    pub(crate) fn records(&self) -> Vec<Vec<Option<&Cell>>> {
        let (Some(col_lower), Some(col_upper)) = (self.col_lower_bound, self.col_upper_bound) else {
            return Vec::new();
        };
        let width = col_upper - col_lower + 1;
        let mut records = Vec::<Vec<Option<&Cell>>>::new();
        let mut current_row = None::<usize>;
        for cell in &self.cells {
            if current_row != Some(cell.row) {
                current_row = Some(cell.row);
                records.push(vec![None; width]);
            }
            if let Some(record) = records.last_mut() {
                record[cell.col - col_lower] = Some(cell);
            }
        }
        records
    }
}
