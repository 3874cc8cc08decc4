//! Helpers for turning raw user input into work items.
//!
//! Suffix normalization, name-file loading and the names × suffixes
//! expansion live here.

use crate::error::WhoisBatchError;
use crate::types::WorkItem;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Normalize a single suffix: trim, lower-case, ensure a leading dot.
///
/// Returns `None` for input that is empty after trimming or consists of a
/// lone dot. Normalization is idempotent: `"cz"`, `".CZ"` and `".cz"` all
/// become `".cz"`.
pub fn normalize_suffix(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{}", lower))
    }
}

/// Parse a suffix list separated by commas and/or whitespace.
///
/// Each token goes through [`normalize_suffix`]. Duplicates are dropped,
/// keeping the first occurrence, so every resulting work item is unique.
///
/// # Example
///
/// ```
/// use whois_batch_lib::parse_suffixes;
///
/// assert_eq!(parse_suffixes("cz, .COM net"), vec![".cz", ".com", ".net"]);
/// ```
pub fn parse_suffixes(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(normalize_suffix)
        .filter(|suffix| seen.insert(suffix.clone()))
        .collect()
}

/// Parse names from text: one per line, trimmed, blank lines ignored.
///
/// Repeated names are kept only once, in first-seen order.
pub fn parse_names(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// Load the name list from a file.
///
/// # Errors
///
/// Returns `FileError` if the file does not exist, cannot be read, or
/// contains no names.
pub fn load_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>, WhoisBatchError> {
    let path = path.as_ref();
    let display = path.to_string_lossy();

    if !path.exists() {
        return Err(WhoisBatchError::file_error(display, "File not found"));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| WhoisBatchError::file_error(display.clone(), format!("Failed to read file: {}", e)))?;

    let names = parse_names(&content);
    if names.is_empty() {
        return Err(WhoisBatchError::file_error(display, "File is empty"));
    }

    Ok(names)
}

/// Build the cartesian product of names × suffixes.
///
/// Items are ordered name-major: every suffix of the first name, then every
/// suffix of the second name, and so on.
pub fn build_work_items(names: &[String], suffixes: &[String]) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(names.len() * suffixes.len());

    for name in names {
        for suffix in suffixes {
            items.push(WorkItem::new(name.as_str(), suffix.as_str()));
        }
    }

    items
}
