//! CLI entry point for the homework rater.
//!
//! Scores a grade workbook, prints the ranking and writes CSV and XLSX
//! reports. A second subcommand converts column letters to numbers.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use homework_rater::analyzers::analyzer::analyze;
use homework_rater::columns::{column_letter_to_index, index_to_column_letter};
use homework_rater::config::Layout;
use homework_rater::locate::{DEFAULT_CANDIDATES, prompt_for_path, resolve_input};
use homework_rater::output::{export_all, log_diagnostics, render_console, render_json};
use homework_rater::parser::load_grid;
use homework_rater::stats::ReportStats;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "homework_rater")]
#[command(about = "Ranks students by bonus points for homework scored at maximum", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a workbook and write the ranked reports
    Analyze {
        /// Workbook to read; default locations are tried when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// JSON file with the sheet layout
        #[arg(short, long)]
        layout: Option<PathBuf>,

        #[command(flatten)]
        overrides: LayoutArgs,

        /// Directory for the CSV and XLSX reports
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the ranking only, without writing report files
        #[arg(long, default_value_t = false)]
        no_export: bool,

        /// Print JSON instead of the console report
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Convert column letters to numbers and numbers to letters
    Columns {
        /// Column letters (e.g. "BB") or 1-based column numbers (e.g. "54")
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Command-line overrides applied on top of the layout file.
#[derive(Args, Debug, Default)]
struct LayoutArgs {
    /// Worksheet name (first sheet by default)
    #[arg(long)]
    sheet: Option<String>,

    /// First assignment column, e.g. "H"
    #[arg(short = 's', long)]
    start_column: Option<String>,

    /// Last assignment column, e.g. "BB"
    #[arg(short = 'e', long)]
    end_column: Option<String>,

    /// Row holding the maximum score of each assignment (1-based)
    #[arg(long)]
    header_row: Option<usize>,

    /// First student row (1-based)
    #[arg(long)]
    first_student_row: Option<usize>,

    /// Last student row (1-based)
    #[arg(long)]
    last_student_row: Option<usize>,

    /// Column holding the student names, e.g. "B"
    #[arg(long)]
    name_column: Option<String>,

    /// Bonus points per assignment scored at maximum
    #[arg(short, long)]
    bonus: Option<u32>,
}

impl LayoutArgs {
    fn apply(self, layout: &mut Layout) {
        if self.sheet.is_some() {
            layout.sheet = self.sheet;
        }
        if let Some(v) = self.start_column {
            layout.start_column = v;
        }
        if let Some(v) = self.end_column {
            layout.end_column = v;
        }
        if let Some(v) = self.header_row {
            layout.header_row = v;
        }
        if let Some(v) = self.first_student_row {
            layout.first_student_row = v;
        }
        if let Some(v) = self.last_student_row {
            layout.last_student_row = v;
        }
        if let Some(v) = self.name_column {
            layout.name_column = v;
        }
        if let Some(v) = self.bonus {
            layout.bonus_per_assignment = v;
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/homework_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("homework_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            layout,
            overrides,
            output_dir,
            no_export,
            json,
        } => {
            let mut layout = match layout {
                Some(path) => Layout::load(path)?,
                None => Layout::default(),
            };
            overrides.apply(&mut layout);
            run_analyze(file, &layout, &output_dir, no_export, json)?;
        }
        Commands::Columns { values } => {
            for value in values {
                println!("{}", describe_column(&value)?);
            }
        }
    }

    Ok(())
}

/// Loads, scores and reports one workbook. Report files are only written
/// once scoring has succeeded.
#[tracing::instrument(skip(layout, output_dir))]
fn run_analyze(
    file: Option<PathBuf>,
    layout: &Layout,
    output_dir: &Path,
    no_export: bool,
    json: bool,
) -> Result<()> {
    let sheet_layout = layout.resolve().context("Invalid sheet layout")?;

    let path = resolve_input(file, DEFAULT_CANDIDATES, prompt_for_path)?;
    let grid = load_grid(&path, layout.sheet.as_deref())?;
    info!(
        path = %path.display(),
        rows = grid.height(),
        columns = grid.width(),
        "Workbook loaded"
    );

    let analysis = analyze(&grid, &sheet_layout)
        .with_context(|| format!("Could not score {}", path.display()))?;
    log_diagnostics(&analysis.diagnostics);

    let stats = ReportStats::from_analysis(&analysis);
    if json {
        println!("{}", render_json(&analysis, &stats)?);
    } else {
        print!("{}", render_console(&analysis, &stats));
    }

    if no_export {
        info!("Export skipped");
        return Ok(());
    }

    let paths = export_all(output_dir, &analysis, &Local::now())?;
    println!("\nResults saved to: {}", paths.csv.display());
    println!("Full report saved to: {}", paths.xlsx.display());

    Ok(())
}

/// `"H"` becomes `"H = column 8 (index 7)"`, `"54"` becomes `"54 = BB"`.
fn describe_column(value: &str) -> Result<String> {
    let value = value.trim();
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        let number: usize = value.parse()?;
        return Ok(format!("{number} = {}", index_to_column_letter(number)?));
    }

    let index = column_letter_to_index(value)?;
    Ok(format!(
        "{} = column {} (index {index})",
        value.to_ascii_uppercase(),
        index + 1
    ))
}
