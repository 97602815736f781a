use homework_rater::analyzers::analyzer::analyze;
use homework_rater::config::Layout;
use homework_rater::error::AnalysisError;
use homework_rater::grid::{Cell, Grid};
use homework_rater::output::export_all;
use homework_rater::parser::load_grid;
use homework_rater::xlsx::{Sheet, WorkbookWriter};
use std::env;
use std::fs;
use std::path::PathBuf;

fn n(v: f64) -> Cell {
    Cell::Number(v)
}

/// Header in row 2, students in rows 3-5, names in B, assignments in C..F.
fn layout() -> Layout {
    Layout {
        header_row: 2,
        first_student_row: 3,
        last_student_row: 5,
        name_column: "B".into(),
        start_column: "C".into(),
        end_column: "F".into(),
        ..Default::default()
    }
}

fn write_gradebook(name: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    let _ = fs::remove_file(&path);

    let sheet = Sheet {
        name: "Grades".into(),
        headers: ["#", "Student", "Task 1", "Task 2", "Task 3", "Task 4"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: vec![
            vec![Cell::Empty, Cell::text("Max"), n(1.0), n(5.0), n(1.0), n(10.0)],
            vec![n(1.0), Cell::text("Petrov"), n(1.0), n(4.0), n(1.0), n(10.0)],
            vec![n(2.0), Cell::Empty, n(1.0), n(5.0), n(1.0), n(10.0)],
            vec![n(3.0), Cell::text(" Ivanova "), n(1.0), n(5.0), n(0.0), n(10.0)],
        ],
    };

    let mut writer = WorkbookWriter::new();
    writer.add_sheet(sheet).unwrap();
    writer.save(&path).unwrap();
    path
}

#[test]
fn test_full_pipeline_from_workbook() {
    let path = write_gradebook("homework_rater_it_pipeline.xlsx");

    let grid = load_grid(&path, None).expect("Failed to load workbook");
    assert_eq!(grid.height(), 5);
    assert_eq!(grid.width(), 6);

    let analysis = analyze(&grid, &layout().resolve().unwrap()).unwrap();

    let ordinals: Vec<_> = analysis.assignments.iter().map(|a| a.ordinal).collect();
    assert_eq!(ordinals, vec![2, 4]);

    let ranking: Vec<_> = analysis
        .table
        .iter()
        .map(|r| (r.name.as_str(), r.bonus_total))
        .collect();
    assert_eq!(ranking, vec![("Ivanova", 60), ("Petrov", 30)]);
    assert_eq!(analysis.diagnostics.skipped_blank_rows, 1);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_named_sheet_and_missing_sheet() {
    let path = write_gradebook("homework_rater_it_sheets.xlsx");

    assert!(load_grid(&path, Some("Grades")).is_ok());
    assert!(load_grid(&path, Some("Nope")).is_err());

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_exported_report_reads_back() {
    let path = write_gradebook("homework_rater_it_report_input.xlsx");
    let grid = load_grid(&path, None).unwrap();
    let analysis = analyze(&grid, &layout().resolve().unwrap()).unwrap();

    let dir = env::temp_dir().join("homework_rater_it_report");
    let _ = fs::remove_dir_all(&dir);
    let paths = export_all(&dir, &analysis, &chrono::Utc::now()).unwrap();

    let info = load_grid(&paths.xlsx, Some("Assignments")).unwrap();
    assert_eq!(info.get(0, 2), &Cell::text("Column"));
    assert_eq!(info.get(1, 1), &Cell::text("HW-2"));
    assert_eq!(info.get(1, 2), &Cell::text("D"));
    assert_eq!(info.get(2, 3), &Cell::Number(10.0));
    assert_eq!(info.get(2, 4), &Cell::Number(30.0));

    let details = load_grid(&paths.xlsx, Some("Details")).unwrap();
    let last = details.width() - 1;
    assert_eq!(details.get(0, last), &Cell::text("Rank"));
    assert_eq!(details.get(1, 0), &Cell::text("Ivanova"));
    assert_eq!(details.get(2, last), &Cell::Number(2.0));

    let csv = fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 3);

    fs::remove_dir_all(&dir).unwrap();
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_failed_run_reports_structural_error() {
    let mut rows = vec![vec![Cell::Empty; 6]; 5];
    rows[1] = vec![Cell::Empty, Cell::Empty, n(1.0), n(1.0), n(1.0), n(1.0)];
    rows[2][1] = Cell::text("Petrov");
    let grid = Grid::new(rows);

    let err = analyze(&grid, &layout().resolve().unwrap()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::NoQualifyingAssignments {
            start: "C".into(),
            end: "F".into()
        }
    );
}
