use crate::analyzers::types::{Assignment, Diagnostics};
use crate::columns::{ColumnRange, column_name};
use crate::error::{AnalysisError, AnalysisResult};
use crate::grid::{Grid, try_parse_number};

/// Maximum score that marks a column as attendance-style and excludes it.
pub const EXCLUDED_MAX_SCORE: f64 = 1.0;

/// Reads the maximum score of every column in `range` from `header_row` and
/// keeps the columns whose maximum is not exactly 1.
///
/// Empty or non-numeric header cells read as 0 and stay in the list.
/// Ordinals follow the position inside `range` and are not renumbered.
pub fn filter_assignments(
    grid: &Grid,
    header_row: usize,
    range: ColumnRange,
    diagnostics: &mut Diagnostics,
) -> AnalysisResult<Vec<Assignment>> {
    let mut assignments = Vec::new();

    for col in range.indices() {
        let ordinal = col - range.start() + 1;
        let letters = column_name(col);

        let max_score = match try_parse_number(grid.get(header_row, col)) {
            Some(v) => v,
            None => {
                diagnostics.defaulted_max_cells += 1;
                0.0
            }
        };

        if max_score == EXCLUDED_MAX_SCORE {
            diagnostics.excluded_columns.push(letters);
            continue;
        }

        assignments.push(Assignment::new(ordinal, col, letters, max_score));
    }

    diagnostics.note(format!(
        "{} of {} columns qualify ({} excluded with maximum 1)",
        assignments.len(),
        range.len(),
        diagnostics.excluded_columns.len()
    ));

    if assignments.is_empty() {
        return Err(AnalysisError::NoQualifyingAssignments {
            start: range.start_letters(),
            end: range.end_letters(),
        });
    }

    Ok(assignments)
}
