use crate::analyzers::types::{Assignment, Diagnostics, StudentRecord};
use crate::error::{AnalysisError, AnalysisResult};
use crate::grid::{Grid, try_parse_number};

/// Scores every named student in `rows` (inclusive) against `assignments`.
///
/// A row with a blank name is skipped. A score counts as a max hit only when
/// it equals the assignment maximum exactly. The returned table is sorted by
/// bonus, highest first, keeping sheet order between equal bonuses.
pub fn aggregate_scores(
    grid: &Grid,
    rows: (usize, usize),
    name_column: usize,
    assignments: &[Assignment],
    bonus_per_assignment: u32,
    diagnostics: &mut Diagnostics,
) -> AnalysisResult<Vec<StudentRecord>> {
    let (first, last) = rows;
    let mut table = Vec::new();

    for row in first..=last {
        let name_cell = grid.get(row, name_column);
        if name_cell.is_blank() {
            diagnostics.skipped_blank_rows += 1;
            continue;
        }

        let mut scores = Vec::with_capacity(assignments.len());
        let mut max_hits = Vec::new();

        for assignment in assignments {
            let score = match try_parse_number(grid.get(row, assignment.column_index)) {
                Some(v) => v,
                None => {
                    diagnostics.defaulted_score_cells += 1;
                    0.0
                }
            };

            if score == assignment.max_score {
                max_hits.push(assignment.name.clone());
            }
            scores.push(score);
        }

        let bonus_total = (max_hits.len() as u32).saturating_mul(bonus_per_assignment);

        table.push(StudentRecord {
            name: name_cell.to_string().trim().to_string(),
            row,
            scores,
            max_hits,
            bonus_total,
        });
    }

    if table.is_empty() {
        return Err(AnalysisError::NoStudentData {
            first: first + 1,
            last: last + 1,
        });
    }

    // `sort_by` is stable, so equal bonuses keep their sheet order.
    table.sort_by(|a, b| b.bonus_total.cmp(&a.bonus_total));

    diagnostics.note(format!(
        "{} students scored ({} blank rows skipped)",
        table.len(),
        diagnostics.skipped_blank_rows
    ));

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn assignments(maxima: &[f64]) -> Vec<Assignment> {
        maxima
            .iter()
            .enumerate()
            .map(|(i, m)| Assignment::new(i + 1, i + 1, crate::columns::column_name(i + 1), *m))
            .collect()
    }

    /// Student rows laid out as `[name, score, score, ...]`.
    fn students(rows: Vec<Vec<Cell>>) -> Grid {
        Grid::new(rows)
    }

    fn run(grid: &Grid, assignments: &[Assignment]) -> AnalysisResult<Vec<StudentRecord>> {
        let mut diagnostics = Diagnostics::default();
        aggregate_scores(grid, (0, grid.height() - 1), 0, assignments, 30, &mut diagnostics)
    }

    #[test]
    fn test_single_student_all_max() {
        let grid = students(vec![vec!["Ivanova".into(), Cell::Number(5.0), Cell::Number(10.0)]]);
        let table = run(&grid, &assignments(&[5.0, 10.0])).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].max_hit_count(), 2);
        assert_eq!(table[0].bonus_total, 60);
        assert_eq!(table[0].max_hits, vec!["HW-1", "HW-2"]);
    }

    #[test]
    fn test_bonus_is_hits_times_thirty() {
        let grid = students(vec![
            vec!["A".into(), Cell::Number(5.0), Cell::Number(9.0), Cell::Number(3.0)],
            vec!["B".into(), Cell::Number(4.0), Cell::Number(10.0), Cell::Number(3.0)],
            vec!["C".into(), Cell::Number(0.0), Cell::Number(0.0), Cell::Number(0.0)],
        ]);
        let list = assignments(&[5.0, 10.0, 3.0]);
        let table = run(&grid, &list).unwrap();

        for record in &table {
            let expected = record
                .scores
                .iter()
                .zip(&list)
                .filter(|(s, a)| **s == a.max_score)
                .count();
            assert_eq!(record.max_hit_count(), expected);
            assert_eq!(record.bonus_total as usize, 30 * expected);
            assert_eq!(record.scores.len(), list.len());
        }
    }

    #[test]
    fn test_sorted_descending_and_stable() {
        let grid = students(vec![
            vec!["First".into(), Cell::Number(0.0), Cell::Number(0.0)],
            vec!["Second".into(), Cell::Number(5.0), Cell::Number(0.0)],
            vec!["Third".into(), Cell::Number(0.0), Cell::Number(0.0)],
            vec!["Fourth".into(), Cell::Number(5.0), Cell::Number(10.0)],
            vec!["Fifth".into(), Cell::Number(0.0), Cell::Number(10.0)],
        ]);
        let table = run(&grid, &assignments(&[5.0, 10.0])).unwrap();

        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Fourth", "Second", "Fifth", "First", "Third"]);
        assert!(table.windows(2).all(|w| w[0].bonus_total >= w[1].bonus_total));
    }

    #[test]
    fn test_blank_names_skipped() {
        let grid = students(vec![
            vec!["  Petrov ".into(), Cell::Number(5.0)],
            vec![Cell::Empty, Cell::Number(5.0)],
            vec![Cell::text("   "), Cell::Number(5.0)],
            vec!["Sidorov".into(), Cell::Number(1.0)],
        ]);
        let mut diagnostics = Diagnostics::default();
        let table =
            aggregate_scores(&grid, (0, 3), 0, &assignments(&[5.0]), 30, &mut diagnostics).unwrap();

        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Petrov", "Sidorov"]);
        assert_eq!(table[1].row, 3);
        assert_eq!(diagnostics.skipped_blank_rows, 2);
    }

    #[test]
    fn test_missing_and_text_scores_read_as_zero() {
        let grid = students(vec![vec!["Kim".into(), Cell::Empty, Cell::text("absent"), Cell::text(" 3 ")]]);
        let mut diagnostics = Diagnostics::default();
        let table = aggregate_scores(
            &grid,
            (0, 0),
            0,
            &assignments(&[5.0, 10.0, 3.0]),
            30,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(table[0].scores, vec![0.0, 0.0, 3.0]);
        assert_eq!(table[0].max_hits, vec!["HW-3"]);
        assert_eq!(diagnostics.defaulted_score_cells, 2);
    }

    #[test]
    fn test_zero_max_with_blank_score_counts_as_hit() {
        // A column whose maximum is blank (0) is still active, so a blank
        // score (0) matches it.
        let grid = students(vec![vec!["Lee".into(), Cell::Empty]]);
        let table = run(&grid, &assignments(&[0.0])).unwrap();

        assert_eq!(table[0].max_hit_count(), 1);
        assert_eq!(table[0].bonus_total, 30);
    }

    #[test]
    fn test_exact_equality_only() {
        let grid = students(vec![vec!["Ng".into(), Cell::Number(4.999999)]]);
        let table = run(&grid, &assignments(&[5.0])).unwrap();
        assert_eq!(table[0].max_hit_count(), 0);
    }

    #[test]
    fn test_custom_bonus_value() {
        let grid = students(vec![vec!["Ng".into(), Cell::Number(5.0)]]);
        let mut diagnostics = Diagnostics::default();
        let table =
            aggregate_scores(&grid, (0, 0), 0, &assignments(&[5.0]), 12, &mut diagnostics).unwrap();
        assert_eq!(table[0].bonus_total, 12);
    }

    #[test]
    fn test_no_students_is_an_error() {
        let grid = students(vec![vec![Cell::Empty, Cell::Number(5.0)], vec![Cell::text(" ")]]);
        assert_eq!(
            run(&grid, &assignments(&[5.0])),
            Err(AnalysisError::NoStudentData { first: 1, last: 2 })
        );
    }
}
