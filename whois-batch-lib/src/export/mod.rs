//! Batch exporters.
//!
//! Each exporter renders the full set of retained records once the run has
//! finished. Rendering is separate from writing so the formats can be
//! inspected without touching the filesystem.

mod csv;
mod html;
mod json;

pub use self::csv::{render_csv, CSV_HEADER};
pub use self::html::{render_html, DEFAULT_HTML_TITLE};
pub use self::json::render_json;

use crate::error::WhoisBatchError;
use crate::types::ResultRecord;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

impl ExportFormat {
    /// Default file name used when the format is enabled without a path.
    pub fn default_path(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "results.csv",
            ExportFormat::Json => "results.json",
            ExportFormat::Html => "results.html",
        }
    }

    /// Render records to the format's text representation.
    pub fn render(&self, records: &[ResultRecord]) -> Result<String, WhoisBatchError> {
        match self {
            ExportFormat::Csv => Ok(render_csv(records)),
            ExportFormat::Json => render_json(records),
            ExportFormat::Html => Ok(render_html(records, DEFAULT_HTML_TITLE)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Json => write!(f, "JSON"),
            ExportFormat::Html => write!(f, "HTML"),
        }
    }
}

/// Render `records` and write them to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns `ExportError` if rendering or writing fails.
pub fn export_records<P: AsRef<Path>>(
    format: ExportFormat,
    records: &[ResultRecord],
    path: P,
) -> Result<(), WhoisBatchError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    let content = format
        .render(records)
        .map_err(|e| WhoisBatchError::export(path_str.clone(), e.to_string()))?;

    fs::write(path, content).map_err(|e| WhoisBatchError::export(path_str.clone(), e.to_string()))?;

    debug!(path = %path_str, format = %format, rows = records.len(), "export written");
    Ok(())
}
