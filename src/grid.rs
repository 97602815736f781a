//! In-memory cell grid the pipeline reads from.

use std::fmt;

/// A single spreadsheet value after loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Whether the cell carries nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Interprets a cell as a real number.
///
/// Text is trimmed and parsed, so `" 5 "` reads as `5.0`. Returns `None`
/// for empty cells and text that is not a finite number, which lets callers
/// tell missing data apart from an explicit zero.
pub fn try_parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Number(_) => None,
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Cell::Empty => None,
    }
}

/// Rectangular, read-only grid addressed by zero-based `(row, column)`.
///
/// Rows shorter than [`Grid::width`] behave as if padded with empty cells.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

static EMPTY: Cell = Cell::Empty;

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the cell at `(row, col)`, or an empty cell outside the grid.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}
