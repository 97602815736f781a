//! Sheet layout configuration.
//!
//! Rows are written 1-based, the way they appear in a spreadsheet, and
//! columns as letters. A layout can be stored as a JSON file:
//! ```json
//! {
//!   "sheet": "Grades",
//!   "header_row": 7,
//!   "first_student_row": 8,
//!   "last_student_row": 34,
//!   "name_column": "B",
//!   "start_column": "H",
//!   "end_column": "BB",
//!   "bonus_per_assignment": 30
//! }
//! ```
//! Every field is optional and falls back to the defaults above.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::columns::{ColumnRange, column_letter_to_index, column_name};
use crate::error::{AnalysisError, AnalysisResult};
use crate::grid::Grid;

/// Bonus granted for every assignment scored at its maximum.
pub const DEFAULT_BONUS_PER_ASSIGNMENT: u32 = 30;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Worksheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    /// Row holding the maximum score of each assignment.
    pub header_row: usize,
    pub first_student_row: usize,
    pub last_student_row: usize,
    pub name_column: String,
    pub start_column: String,
    pub end_column: String,
    pub bonus_per_assignment: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            sheet: None,
            header_row: 7,
            first_student_row: 8,
            last_student_row: 34,
            name_column: "B".to_string(),
            start_column: "H".to_string(),
            end_column: "BB".to_string(),
            bonus_per_assignment: DEFAULT_BONUS_PER_ASSIGNMENT,
        }
    }
}

impl Layout {
    /// Loads a layout from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file {}", path.display()))?;
        let layout = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse layout JSON in {}", path.display()))?;
        Ok(layout)
    }

    /// Converts the user-facing layout into zero-based positions.
    pub fn resolve(&self) -> AnalysisResult<SheetLayout> {
        let header_row = to_zero_based("header row", self.header_row)?;
        let first = to_zero_based("first student row", self.first_student_row)?;
        let last = to_zero_based("last student row", self.last_student_row)?;
        if first > last {
            return Err(AnalysisError::InvalidLayout(format!(
                "first student row {} is after last student row {}",
                self.first_student_row, self.last_student_row
            )));
        }

        Ok(SheetLayout {
            header_row,
            student_rows: (first, last),
            name_column: column_letter_to_index(&self.name_column)?,
            columns: ColumnRange::from_letters(&self.start_column, &self.end_column)?,
            bonus_per_assignment: self.bonus_per_assignment,
        })
    }
}

fn to_zero_based(field: &str, row: usize) -> AnalysisResult<usize> {
    row.checked_sub(1)
        .ok_or_else(|| AnalysisError::InvalidLayout(format!("{field} must be 1 or greater")))
}

/// Zero-based layout, validated once against the grid before scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetLayout {
    pub header_row: usize,
    /// Inclusive `(first, last)` student rows.
    pub student_rows: (usize, usize),
    pub name_column: usize,
    pub columns: ColumnRange,
    pub bonus_per_assignment: u32,
}

impl SheetLayout {
    /// Rejects any row or column that lies outside `grid`.
    pub fn check_bounds(&self, grid: &Grid) -> AnalysisResult<()> {
        let rows = grid.height();
        let cols = grid.width();

        let row_checks = [
            ("header row", self.header_row),
            ("last student row", self.student_rows.1),
        ];
        for (field, row) in row_checks {
            if row >= rows {
                return Err(AnalysisError::LayoutOutOfBounds {
                    field,
                    position: format!("row {}", row + 1),
                    limit: rows,
                });
            }
        }

        let col_checks = [
            ("name column", self.name_column),
            ("end column", self.columns.end()),
        ];
        for (field, col) in col_checks {
            if col >= cols {
                return Err(AnalysisError::LayoutOutOfBounds {
                    field,
                    position: format!("column {}", column_name(col)),
                    limit: cols,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn grid(rows: usize, cols: usize) -> Grid {
        Grid::new(vec![vec![Cell::Empty; cols]; rows])
    }

    #[test]
    fn test_default_layout_resolves() {
        let layout = Layout::default().resolve().unwrap();
        assert_eq!(layout.header_row, 6);
        assert_eq!(layout.student_rows, (7, 33));
        assert_eq!(layout.name_column, 1);
        assert_eq!(layout.columns, ColumnRange::new(7, 53).unwrap());
        assert_eq!(layout.bonus_per_assignment, 30);
    }

    #[test]
    fn test_zero_row_rejected() {
        let layout = Layout {
            header_row: 0,
            ..Default::default()
        };
        assert!(matches!(
            layout.resolve(),
            Err(AnalysisError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_reversed_student_rows_rejected() {
        let layout = Layout {
            first_student_row: 10,
            last_student_row: 9,
            ..Default::default()
        };
        assert!(matches!(
            layout.resolve(),
            Err(AnalysisError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_bad_column_letters_rejected() {
        let layout = Layout {
            end_column: "B1".into(),
            ..Default::default()
        };
        assert_eq!(
            layout.resolve(),
            Err(AnalysisError::InvalidColumn("B1".into()))
        );
    }

    #[test]
    fn test_check_bounds() {
        let layout = Layout::default().resolve().unwrap();

        assert!(layout.check_bounds(&grid(34, 54)).is_ok());

        let err = layout.check_bounds(&grid(20, 54)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LayoutOutOfBounds {
                field: "last student row",
                position: "row 34".into(),
                limit: 20,
            }
        );

        let err = layout.check_bounds(&grid(34, 40)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LayoutOutOfBounds {
                field: "end column",
                position: "column BB".into(),
                limit: 40,
            }
        );
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let path = temp_path("homework_rater_test_layout.json");
        fs::write(&path, r#"{ "start_column": "C", "end_column": "F", "bonus_per_assignment": 10 }"#)
            .unwrap();

        let layout = Layout::load(&path).unwrap();
        assert_eq!(layout.start_column, "C");
        assert_eq!(layout.end_column, "F");
        assert_eq!(layout.bonus_per_assignment, 10);
        assert_eq!(layout.header_row, 7);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let path = temp_path("homework_rater_test_layout_unknown.json");
        fs::write(&path, r#"{ "bonus": 10 }"#).unwrap();

        assert!(Layout::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }
}
