// Cell values and column references

use crate::error::CoreError;

/// Widest column an xlsx sheet can address (XFD).
pub const MAX_COLUMNS: usize = 16_384;

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula source (no leading `=`) and the value it last computed to.
    Formula { source: String, cached: Box<Cell> },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn formula(source: &str, cached: Cell) -> Self {
        Cell::Formula {
            source: source.trim_start_matches('=').to_string(),
            cached: Box::new(cached),
        }
    }

    /// Cell rendered as text, or `None` when the cell is empty or holds an
    /// empty string.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Cell::Formula { cached, .. } => cached.as_text(),
        }
    }

    /// A formula is never empty, even when its result is.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Formula { .. } => false,
            _ => self.as_text().is_none(),
        }
    }
}

/// Integers without decimals, everything else as-is.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse column letters ("A", "k", "AA") into a 0-based index.
pub fn column_index(letters: &str) -> Result<usize, CoreError> {
    let trimmed = letters.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::InvalidColumn(letters.to_string()));
    }

    let mut col: usize = 0;
    for ch in trimmed.chars() {
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| CoreError::InvalidColumn(letters.to_string()))?;
    }
    let col = col - 1;

    if col >= MAX_COLUMNS {
        return Err(CoreError::InvalidColumn(letters.to_string()));
    }
    Ok(col)
}

/// Convert a 0-based column index to letters (0 = A, 25 = Z, 26 = AA).
pub fn column_letters(col: usize) -> String {
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
