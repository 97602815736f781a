//! Rendering and export of a finished [`Analysis`].
//!
//! Supports a console report, JSON, a CSV export and a three-sheet XLSX
//! workbook. Nothing here changes the analysis or its ordering.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analyzers::types::{Analysis, Diagnostics, StudentRecord};
use crate::analyzers::utility::round1;
use crate::grid::Cell;
use crate::stats::ReportStats;
use crate::xlsx::{Sheet, WorkbookWriter};

/// Number of leading assignments echoed next to each student for checking.
const SAMPLE_ASSIGNMENTS: usize = 3;
const TOP_TABLE_ROWS: usize = 20;
const TOP_STUDENTS: usize = 5;
const HITS_LABEL_WIDTH: usize = 38;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Headers and rows of one exported table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn into_sheet(self, name: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            headers: self.headers,
            rows: self.rows,
        }
    }
}

/// One row per student in ranking order.
pub fn results_table(analysis: &Analysis) -> Table {
    let samples = &analysis.assignments[..analysis.assignments.len().min(SAMPLE_ASSIGNMENTS)];

    let mut headers: Vec<String> = [
        "Student",
        "Max-score assignments",
        "Max-score count",
        "Bonus points",
        "Total assignments",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    for a in samples {
        headers.push(format!("{} score", a.name));
        headers.push(format!("{} max", a.name));
    }

    let rows = analysis
        .table
        .iter()
        .map(|record| {
            let mut row = vec![
                Cell::text(record.name.as_str()),
                Cell::text(record.max_hits_label()),
                Cell::Number(record.max_hit_count() as f64),
                Cell::Number(record.bonus_total as f64),
                Cell::Number(record.total_assignments() as f64),
            ];
            for (i, a) in samples.iter().enumerate() {
                row.push(Cell::Number(record.scores[i]));
                row.push(Cell::Number(a.max_score));
            }
            row
        })
        .collect();

    Table { headers, rows }
}

/// Metadata of every retained assignment.
pub fn assignments_table(analysis: &Analysis) -> Table {
    let headers = ["Number", "Name", "Column", "Max score", "Bonus"]
        .iter()
        .map(|h| h.to_string())
        .collect();

    let rows = analysis
        .assignments
        .iter()
        .map(|a| {
            vec![
                Cell::Number(a.ordinal as f64),
                Cell::text(a.name.as_str()),
                Cell::text(a.column.as_str()),
                Cell::Number(a.max_score),
                Cell::Number(analysis.bonus_per_assignment as f64),
            ]
        })
        .collect();

    Table { headers, rows }
}

/// The results table plus the share of assignments at max and the rank.
pub fn details_table(analysis: &Analysis) -> Table {
    let mut table = results_table(analysis);
    table.headers.push("% at max".to_string());
    table.headers.push("Rank".to_string());

    for (rank, (row, record)) in table.rows.iter_mut().zip(&analysis.table).enumerate() {
        row.push(Cell::Number(round1(record.percent_at_max())));
        row.push(Cell::Number((rank + 1) as f64));
    }

    table
}

/// Writes the results table as UTF-8 CSV with a byte-order mark, so that
/// spreadsheet programs detect the encoding.
pub fn write_results_csv(path: impl AsRef<Path>, analysis: &Analysis) -> Result<()> {
    let path = path.as_ref();
    let table = results_table(analysis);
    debug!(path = %path.display(), rows = table.rows.len(), "Writing CSV export");

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the `Results`, `Assignments` and `Details` sheets to `path`.
pub fn write_report_xlsx(path: impl AsRef<Path>, analysis: &Analysis) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Writing XLSX report");

    let mut workbook = WorkbookWriter::new();
    workbook
        .add_sheet(results_table(analysis).into_sheet("Results"))?
        .add_sheet(assignments_table(analysis).into_sheet("Assignments"))?
        .add_sheet(details_table(analysis).into_sheet("Details"))?;
    workbook.save(path)
}

/// Paths of the files produced by [`export_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
}

/// File names such as `results_H_to_BB_20261019_1430.csv`.
pub fn export_paths<Tz: TimeZone>(
    dir: impl AsRef<Path>,
    analysis: &Analysis,
    at: &DateTime<Tz>,
) -> ExportPaths
where
    Tz::Offset: std::fmt::Display,
{
    let (start, end) = analysis.range_letters();
    let stamp = at.format("%Y%m%d_%H%M");
    let dir = dir.as_ref();
    ExportPaths {
        csv: dir.join(format!("results_{start}_to_{end}_{stamp}.csv")),
        xlsx: dir.join(format!("report_{start}_to_{end}_{stamp}.xlsx")),
    }
}

/// Writes the CSV export and the XLSX report into `dir`.
#[tracing::instrument(skip(dir, analysis, at), fields(dir = %dir.as_ref().display()))]
pub fn export_all<Tz: TimeZone>(
    dir: impl AsRef<Path>,
    analysis: &Analysis,
    at: &DateTime<Tz>,
) -> Result<ExportPaths>
where
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(dir.as_ref())
        .with_context(|| format!("Failed to create output directory {}", dir.as_ref().display()))?;

    let paths = export_paths(dir, analysis, at);
    write_results_csv(&paths.csv, analysis)?;
    write_report_xlsx(&paths.xlsx, analysis)?;

    info!(csv = %paths.csv.display(), xlsx = %paths.xlsx.display(), "Reports written");
    Ok(paths)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    start_column: String,
    end_column: String,
    #[serde(flatten)]
    analysis: &'a Analysis,
    stats: &'a ReportStats,
}

/// Serializes the analysis and its statistics as pretty-printed JSON.
pub fn render_json(analysis: &Analysis, stats: &ReportStats) -> Result<String> {
    let (start_column, end_column) = analysis.range_letters();
    let report = JsonReport {
        start_column,
        end_column,
        analysis,
        stats,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Emits the pipeline's data-quality notes through `tracing`.
pub fn log_diagnostics(diagnostics: &Diagnostics) {
    for note in &diagnostics.notes {
        info!("{}", note);
    }
    if !diagnostics.excluded_columns.is_empty() {
        debug!(columns = ?diagnostics.excluded_columns, "Columns excluded with maximum 1");
    }
    if diagnostics.defaulted_max_cells > 0 {
        warn!(
            cells = diagnostics.defaulted_max_cells,
            "Empty or non-numeric maximum scores read as 0"
        );
    }
    if diagnostics.defaulted_score_cells > 0 {
        debug!(
            cells = diagnostics.defaulted_score_cells,
            "Empty or non-numeric scores read as 0"
        );
    }
}

/// Shortens the list of max-score assignments to fit the console table.
pub fn abbreviate_hits(record: &StudentRecord) -> String {
    let label = record.max_hits_label();
    if label.chars().count() <= HITS_LABEL_WIDTH {
        return label;
    }

    let shown = record.max_hits[..4.min(record.max_hits.len())].join(", ");
    let hidden = record.max_hits.len().saturating_sub(4);
    if hidden > 0 {
        format!("{shown} (+{hidden} more)")
    } else {
        shown
    }
}

/// Human-readable report for the terminal.
pub fn render_console(analysis: &Analysis, stats: &ReportStats) -> String {
    let mut out = String::new();
    let (start, end) = analysis.range_letters();
    let rule = "=".repeat(100);
    let thin = "-".repeat(100);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "MAXIMUM SCORES (columns {start} to {end}, maximum 1 ignored)");
    let _ = writeln!(out, "{thin}");
    for (i, a) in analysis.assignments.iter().enumerate() {
        let _ = write!(
            out,
            "{:3}. {:<8} ({:>3}): {:>4} pts   ",
            i + 1,
            a.name,
            a.column,
            a.max_score
        );
        if (i + 1) % 4 == 0 {
            out.push('\n');
        }
    }
    if analysis.assignments.len() % 4 != 0 {
        out.push('\n');
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "RESULTS (TOP {TOP_TABLE_ROWS})");
    let _ = writeln!(out, "{thin}");
    let _ = writeln!(
        out,
        "{:<4} {:<20} {:<40} {:<7} {:<7}",
        "#", "Student", "Max-score assignments", "Count", "Bonus"
    );
    let _ = writeln!(out, "{thin}");
    for (i, record) in analysis.table.iter().take(TOP_TABLE_ROWS).enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<40} {:<7} {:<7}",
            i + 1,
            record.name,
            abbreviate_hits(record),
            record.max_hit_count(),
            record.bonus_total
        );
    }
    let _ = writeln!(out, "{thin}");

    let _ = writeln!(out, "\nSTATISTICS ({} students)", stats.total_students);
    let _ = writeln!(
        out,
        "- Columns {start}-{end} ({} assignments)",
        stats.assignment_count
    );
    let _ = writeln!(
        out,
        "- Students with bonus: {} ({:.1}%)",
        stats.students_with_bonus, stats.bonus_share_pct
    );
    let _ = writeln!(out, "- Total bonus: {}", stats.total_bonus);
    let _ = writeln!(out, "- Mean bonus per student: {:.1}", stats.mean_bonus);

    let _ = writeln!(out, "\nTOP {TOP_STUDENTS}");
    for (i, record) in analysis.table.iter().take(TOP_STUDENTS).enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} points ({} assignments at max)",
            i + 1,
            record.name,
            record.bonus_total,
            record.max_hit_count()
        );
    }

    let _ = writeln!(out, "\nASSIGNMENTS");
    let _ = writeln!(out, "- Analysed: {}", stats.assignment_count);
    if let (Some(lo), Some(hi)) = (stats.lowest_max_score, stats.highest_max_score) {
        let _ = writeln!(out, "- Max score range: {lo} - {hi}");
    }
    if !stats.max_score_buckets.is_empty() {
        let _ = writeln!(out, "- Max score distribution:");
        for bucket in &stats.max_score_buckets {
            let _ = writeln!(
                out,
                "    {}: {} assignments ({:.1}%)",
                bucket.label, bucket.count, bucket.pct
            );
        }
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "CHECK (first {SAMPLE_ASSIGNMENTS} students)");
    let _ = writeln!(out, "{rule}");
    for (i, record) in analysis.table.iter().take(SAMPLE_ASSIGNMENTS).enumerate() {
        let _ = writeln!(out, "\n{} (rank #{}):", record.name, i + 1);
        let _ = writeln!(out, "  Bonus points: {}", record.bonus_total);
        let _ = writeln!(
            out,
            "  At max: {} of {}",
            record.max_hit_count(),
            record.total_assignments()
        );
        for (a, score) in analysis
            .assignments
            .iter()
            .zip(&record.scores)
            .take(SAMPLE_ASSIGNMENTS)
        {
            if *score == a.max_score {
                let _ = writeln!(out, "  {}: MAX", a.name);
            } else {
                let _ = writeln!(out, "  {}: {}/{}", a.name, score, a.max_score);
            }
        }
    }

    out
}
