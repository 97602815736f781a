//! Workbook loader built on `calamine`.

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

use crate::grid::{Cell, Grid};

/// Reads one worksheet of `path` into a [`Grid`].
///
/// Uses the first worksheet when `sheet` is `None`. Cell positions are kept
/// absolute, so a sheet whose used area starts at `B2` still puts `B2` at
/// `(1, 1)`. The file is closed before this returns, on success or failure.
///
/// # Errors
///
/// Returns an error if the file cannot be opened as a workbook, the sheet does
/// not exist, or the workbook has no sheets.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_grid(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Grid> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("Workbook {} has no worksheets", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet_name))?;

    let Some((row0, col0)) = range.start() else {
        debug!(sheet = %sheet_name, "Worksheet is empty");
        return Ok(Grid::default());
    };
    let (row0, col0) = (row0 as usize, col0 as usize);
    let (height, width) = range.get_size();

    let mut rows = vec![vec![Cell::Empty; col0 + width]; row0 + height];
    for (r, c, value) in range.cells() {
        rows[row0 + r][col0 + c] = to_cell(value);
    }

    let grid = Grid::new(rows);
    debug!(
        sheet = %sheet_name,
        rows = grid.height(),
        columns = grid.width(),
        "Worksheet loaded"
    );
    Ok(grid)
}

/// Maps a calamine value onto the pipeline's cell model.
///
/// Dates keep their serial number, booleans read as 1 and 0, and error
/// cells read as empty.
pub fn to_cell(value: &Data) -> Cell {
    match value {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}
