//! Glob filtering of changed file paths.
//!
//! Used to narrow the paths a PR touched down to job-config files. The
//! pattern is caller configuration; a syntactically invalid pattern is the
//! only failure mode and is surfaced as fatal for the event being processed.

use glob::{Pattern, PatternError};

/// Filters `paths` down to those matching `pattern`, preserving input order.
///
/// Zero matches is an empty result, not an error; only a malformed pattern
/// fails.
pub fn filter_by_pattern(paths: &[String], pattern: &str) -> Result<Vec<String>, PatternError> {
    let pattern = Pattern::new(pattern)?;
    Ok(paths
        .iter()
        .filter(|path| pattern.matches(path))
        .cloned()
        .collect())
}
