//! Input workbook discovery.

use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locations tried, in order, when no input file is given.
pub const DEFAULT_CANDIDATES: &[&str] = &["homework.xlsx", "data/input/homework.xlsx"];

/// Returns the first candidate that exists on disk.
pub fn first_existing<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|p| p.as_ref())
        .inspect(|p| debug!(path = %p.display(), "Checking input candidate"))
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

/// Picks the workbook to analyse.
///
/// An explicit path wins. Otherwise the candidates are tried in order, and
/// `prompt` is asked for a path only if none exists. Fails if the chosen path
/// does not exist.
pub fn resolve_input<P, F>(explicit: Option<PathBuf>, candidates: &[P], prompt: F) -> Result<PathBuf>
where
    P: AsRef<Path>,
    F: FnOnce() -> Result<String>,
{
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("File '{}' not found", path.display());
        }
        return Ok(path);
    }

    if let Some(path) = first_existing(candidates) {
        info!(path = %path.display(), "Found input file");
        return Ok(path);
    }

    info!("No input file found in the default locations");
    let answer = prompt()?;
    let answer = answer.trim();
    if answer.is_empty() {
        bail!("No input file given");
    }

    let path = PathBuf::from(answer);
    if !path.is_file() {
        bail!("File '{}' not found", path.display());
    }
    Ok(path)
}

/// Asks for a workbook path on stdin.
pub fn prompt_for_path() -> Result<String> {
    print!("Enter the full path to the workbook: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read path from stdin")?;
    Ok(line)
}
