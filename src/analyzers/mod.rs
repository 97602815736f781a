//! Homework scoring pipeline.
//!
//! Reads the maximum-score header, drops columns whose maximum is 1, scores
//! every student against the remaining assignments and ranks them by bonus.

pub mod aggregate;
pub mod analyzer;
pub mod assignments;
pub mod types;
pub mod utility;
