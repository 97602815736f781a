use crate::analyzers::aggregate::aggregate_scores;
use crate::analyzers::assignments::filter_assignments;
use crate::analyzers::types::{Analysis, Diagnostics};
use crate::config::SheetLayout;
use crate::error::AnalysisResult;
use crate::grid::Grid;

/// Runs the full scoring pipeline over `grid`.
///
/// The layout is checked against the grid first. Nothing is logged here;
/// data-quality notes come back in [`Analysis::diagnostics`].
pub fn analyze(grid: &Grid, layout: &SheetLayout) -> AnalysisResult<Analysis> {
    layout.check_bounds(grid)?;

    let mut diagnostics = Diagnostics::default();
    diagnostics.note(format!(
        "analysing columns {}:{} ({} columns), students on rows {}-{}",
        layout.columns.start_letters(),
        layout.columns.end_letters(),
        layout.columns.len(),
        layout.student_rows.0 + 1,
        layout.student_rows.1 + 1,
    ));

    let assignments = filter_assignments(grid, layout.header_row, layout.columns, &mut diagnostics)?;

    let table = aggregate_scores(
        grid,
        layout.student_rows,
        layout.name_column,
        &assignments,
        layout.bonus_per_assignment,
        &mut diagnostics,
    )?;

    Ok(Analysis {
        columns: layout.columns,
        bonus_per_assignment: layout.bonus_per_assignment,
        assignments,
        table,
        diagnostics,
    })
}
