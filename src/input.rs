//! Line-oriented source of search terms.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Reads one search term per line. Lines are trimmed; blank lines and lines
/// starting with `#` are skipped.
pub fn read_terms(reader: impl BufRead) -> Result<Vec<String>> {
    let mut terms = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", number + 1))?;
        let term = line.trim();
        if term.is_empty() || term.starts_with('#') {
            continue;
        }
        terms.push(term.to_string());
    }

    Ok(terms)
}

/// Loads search terms from a file.
pub fn load_terms(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    debug!("Loading search terms from: {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open search term file: {}", path.display()))?;

    read_terms(BufReader::new(file))
        .with_context(|| format!("Failed to read search term file: {}", path.display()))
}
