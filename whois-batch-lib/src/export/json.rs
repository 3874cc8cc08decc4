//! JSON export.

use crate::error::WhoisBatchError;
use crate::types::ResultRecord;

/// Render records as a pretty-printed JSON array.
pub fn render_json(records: &[ResultRecord]) -> Result<String, WhoisBatchError> {
    Ok(serde_json::to_string_pretty(records)?)
}
