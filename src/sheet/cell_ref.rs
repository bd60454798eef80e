//! A1-style cell references.

/// Parse a reference like `"B12"` or `b"$B$12"` into 0-indexed `(col, row)`.
///
/// Works on raw attribute bytes straight from quick-xml.
#[must_use]
pub fn parse_cell_ref(reference: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in reference {
        match b {
            b'$' => {}
            b'A'..=b'Z' | b'a'..=b'z' if !saw_row => {
                let upper = b.to_ascii_uppercase();
                col = col
                    .saturating_mul(26)
                    .saturating_add(u32::from(upper - b'A') + 1);
                saw_col = true;
            }
            b'0'..=b'9' if saw_col => {
                row = row.saturating_mul(10).saturating_add(u32::from(b - b'0'));
                saw_row = true;
            }
            _ => return None,
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((col - 1, row - 1))
}

/// Convert a 0-based column index to letters (A, B, ..., Z, AA, AB, ...).
#[must_use]
pub fn col_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or(0);
        letters.push(char::from(b'A' + offset));
        n /= 26;
    }
    letters.iter().rev().collect()
}
