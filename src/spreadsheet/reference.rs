//! Conversion between A1-style cell references and 0-based indexes.

/// Index of column `XFD`, the last column a worksheet can have.
pub(crate) const MAX_COL_INDEX: usize = 16383;

/// `"A"` → `0`, `"Z"` → `25`, `"AA"` → `26`. Columns past `XFD` are `None`.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |acc, letter| {
            let letter = letter.to_ascii_uppercase();
            if !letter.is_ascii_uppercase() {
                return None;
            }
            acc.checked_mul(26)?
                .checked_add(letter as usize - 'A' as usize + 1)
                .filter(|number| *number <= MAX_COL_INDEX + 1)
        })
        .map(|number| number - 1)
}

/// `"1"` → `0`.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// `"B3"` → `(2, 1)` as (row, col).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// `(2, 1)` → `"B3"`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = String::new();
    let mut number = col + 1;
    while number > 0 {
        number -= 1;
        letters.insert(0, (b'A' + (number % 26) as u8) as char);
        number /= 26;
    }
    format!("{}{}", letters, row + 1)
}
