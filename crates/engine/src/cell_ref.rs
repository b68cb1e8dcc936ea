// A1-style cell reference parsing and rendering.

/// Parse a cell reference like `B5` into 0-indexed (row, col).
/// Returns `None` for anything that is not letters-then-digits.
pub fn parse_cell_ref(s: &str) -> Option<(usize, usize)> {
    let s = s.trim().to_uppercase();
    let mut col_str = String::new();
    let mut row_str = String::new();

    for c in s.chars() {
        if c.is_ascii_alphabetic() && row_str.is_empty() {
            col_str.push(c);
        } else if c.is_ascii_digit() {
            row_str.push(c);
        } else {
            return None;
        }
    }

    if col_str.is_empty() || row_str.is_empty() {
        return None;
    }

    // Column letters to index (A=0, B=1, ..., Z=25, AA=26, ...)
    let mut col: usize = 0;
    for c in col_str.chars() {
        col = col * 26 + (c as usize - 'A' as usize + 1);
    }
    col -= 1;

    // Rows are 1-indexed in references, 0-indexed internally
    let row: usize = row_str.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}

/// Convert a 0-indexed column to letters (0 -> A, 1 -> B, 26 -> AA, ...)
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Render 0-indexed (row, col) as an A1 reference.
pub fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Reference `n` columns to the right of `location`, same row.
/// This is where an answer most often belongs, so it seeds the
/// response-location prompt.
pub fn offset_right(location: &str, n: usize) -> Option<String> {
    let (row, col) = parse_cell_ref(location)?;
    Some(cell_ref(row, col + n))
}
