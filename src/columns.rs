//! Conversion between spreadsheet column letters and indices.

use crate::error::{AnalysisError, AnalysisResult};

/// Converts column letters (`"A"`, `"bb"`) into a zero-based column index.
///
/// The letters are read as a base-26 numeral with digits `A=1` .. `Z=26`.
pub fn column_letter_to_index(letters: &str) -> AnalysisResult<usize> {
    if letters.is_empty() {
        return Err(AnalysisError::InvalidColumn(letters.to_string()));
    }

    let mut value: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(AnalysisError::InvalidColumn(letters.to_string()));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| AnalysisError::InvalidColumn(letters.to_string()))?;
    }

    Ok(value - 1)
}

/// Converts a one-based column number into its letters (`1 -> "A"`, `54 -> "BB"`).
pub fn index_to_column_letter(one_based: usize) -> AnalysisResult<String> {
    if one_based == 0 {
        return Err(AnalysisError::InvalidColumn(one_based.to_string()));
    }

    let mut letters = Vec::new();
    let mut n = one_based;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();

    Ok(letters.into_iter().map(char::from).collect())
}

/// Letters for a zero-based column index. Never fails.
pub fn column_name(index: usize) -> String {
    index_to_column_letter(index + 1).unwrap_or_default()
}

/// Inclusive, zero-based range of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    start: usize,
    end: usize,
}

impl ColumnRange {
    pub fn new(start: usize, end: usize) -> AnalysisResult<Self> {
        if start > end {
            return Err(AnalysisError::InvalidColumnRange {
                start: column_name(start),
                end: column_name(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a range from user-supplied letters such as `"H"` and `"BB"`.
    pub fn from_letters(start: &str, end: &str) -> AnalysisResult<Self> {
        Self::new(column_letter_to_index(start)?, column_letter_to_index(end)?)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn start_letters(&self) -> String {
        column_name(self.start)
    }

    pub fn end_letters(&self) -> String {
        column_name(self.end)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}
