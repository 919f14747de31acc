use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One entry of a bulk-tracking watchlist: a product URL and the target
/// price it is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub url: String,
    pub target_price: i64,
}

/// Outcome of parsing a single watchlist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Entry(WatchEntry),
    /// No comma on the line; skipped without comment.
    Skipped,
    /// The price field did not parse as an integer; skipped with a warning.
    Invalid { line: String },
}

/// Parse one `URL,integer_price` watchlist line.
pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim();
    let Some((url, price_str)) = line.split_once(',') else {
        return LineOutcome::Skipped;
    };

    match price_str.trim().parse::<i64>() {
        Ok(target_price) => LineOutcome::Entry(WatchEntry {
            url: url.trim().to_string(),
            target_price,
        }),
        Err(_) => LineOutcome::Invalid {
            line: line.to_string(),
        },
    }
}

/// Load a watchlist file: entries in file order, plus one warning message
/// per line whose price field is not an integer.
pub fn load(path: &Path) -> Result<(Vec<WatchEntry>, Vec<String>)> {
    let content = fs::read_to_string(path)?;

    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for line in content.lines() {
        match parse_line(line) {
            LineOutcome::Entry(entry) => entries.push(entry),
            LineOutcome::Skipped => {}
            LineOutcome::Invalid { line } => {
                warnings.push(format!("invalid price in line: {}", line));
            }
        }
    }

    Ok((entries, warnings))
}
