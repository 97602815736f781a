//! Data types produced by the scoring pipeline.

use serde::Serialize;

use crate::columns::ColumnRange;

/// A homework column that counts towards the bonus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// 1-based position inside the configured column range, counting
    /// excluded columns too.
    pub ordinal: usize,
    pub name: String,
    pub column: String,
    #[serde(skip)]
    pub column_index: usize,
    pub max_score: f64,
}

impl Assignment {
    pub fn new(ordinal: usize, column_index: usize, column: String, max_score: f64) -> Self {
        Self {
            ordinal,
            name: format!("HW-{ordinal}"),
            column,
            column_index,
            max_score,
        }
    }
}

/// One student's row after scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub name: String,
    /// Zero-based row in the source sheet.
    pub row: usize,
    /// Raw score per retained assignment, in assignment order.
    pub scores: Vec<f64>,
    /// Names of the assignments scored at their maximum.
    pub max_hits: Vec<String>,
    pub bonus_total: u32,
}

impl StudentRecord {
    pub fn max_hit_count(&self) -> usize {
        self.max_hits.len()
    }

    pub fn total_assignments(&self) -> usize {
        self.scores.len()
    }

    /// Share of assignments scored at maximum, in percent.
    pub fn percent_at_max(&self) -> f64 {
        crate::analyzers::utility::pct(self.max_hit_count(), self.total_assignments())
    }

    /// Assignment names joined for display, or `"None"`.
    pub fn max_hits_label(&self) -> String {
        if self.max_hits.is_empty() {
            "None".to_string()
        } else {
            self.max_hits.join(", ")
        }
    }
}

/// Data-quality notes gathered while scoring. Nothing here aborts a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Column letters dropped because their maximum equals 1.
    pub excluded_columns: Vec<String>,
    /// Header cells that were empty or non-numeric and read as 0.
    pub defaulted_max_cells: usize,
    /// Score cells that were empty or non-numeric and read as 0.
    pub defaulted_score_cells: usize,
    pub skipped_blank_rows: usize,
    pub notes: Vec<String>,
}

impl Diagnostics {
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }
}

/// Result of a successful run: retained assignments and the ranked table.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    #[serde(skip)]
    pub columns: ColumnRange,
    pub bonus_per_assignment: u32,
    pub assignments: Vec<Assignment>,
    pub table: Vec<StudentRecord>,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// Letters of the analysed range, e.g. `("H", "BB")`.
    pub fn range_letters(&self) -> (String, String) {
        (self.columns.start_letters(), self.columns.end_letters())
    }
}
