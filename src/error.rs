//! Structural errors raised by the scoring pipeline.
//!
//! Per-cell data problems never show up here: malformed scores are replaced
//! with zero where they are read and only counted in
//! [`Diagnostics`](crate::analyzers::types::Diagnostics).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid column reference '{0}': expected letters A-Z or a positive column number")]
    InvalidColumn(String),

    #[error("invalid column range {start}:{end}: start column is after end column")]
    InvalidColumnRange { start: String, end: String },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("{field} at {position} is outside the sheet ({limit} available)")]
    LayoutOutOfBounds {
        field: &'static str,
        position: String,
        limit: usize,
    },

    #[error("no qualifying assignments in columns {start}:{end} (every maximum equals 1)")]
    NoQualifyingAssignments { start: String, end: String },

    #[error("no student rows with a name were found in rows {first}-{last}")]
    NoStudentData { first: usize, last: usize },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
