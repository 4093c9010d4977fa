//! Repository list parsing.

use crate::config::ConfigError;
use std::path::Path;
use tracing::debug;

/// Normalizes a repository identifier to the characters GitHub accepts in
/// repository names (`A-Z a-z 0-9 . _ -`).
///
/// Any other character becomes `-`, and leading/trailing `-` are trimmed.
/// Bitbucket derives its slugs the same way, so the result also matches the
/// source slug.
#[must_use]
pub fn normalize_slug(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    replaced.trim_matches('-').to_string()
}

/// Parses a newline-delimited repository list.
///
/// Blank lines and lines starting with `#` are dropped; the remaining
/// entries are normalized with [`normalize_slug`].
#[must_use]
pub fn parse_repo_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize_slug)
        .filter(|slug| !slug.is_empty())
        .collect()
}

/// Reads and parses the repository list file.
///
/// # Errors
///
/// Returns [`ConfigError::IoError`] if the file can't be read.
pub fn load_repo_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let repos = parse_repo_list(&contents);
    debug!(path = %path.display(), count = repos.len(), "Loaded repository list");
    Ok(repos)
}
