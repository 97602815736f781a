pub mod analyzers;
pub mod columns;
pub mod config;
pub mod error;
pub mod grid;
pub mod locate;
pub mod output;
pub mod parser;
pub mod stats;
pub mod xlsx;
