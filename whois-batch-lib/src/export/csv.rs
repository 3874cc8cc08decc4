//! CSV export.

use crate::types::ResultRecord;

/// Header row, in column order.
pub const CSV_HEADER: &str = "name,suffix,domain,available,info";

/// Render records as CSV with a header row, one row per record.
///
/// `available` is written as `true`/`false`. Fields containing commas,
/// quotes or line breaks are quoted, with embedded quotes doubled.
pub fn render_csv(records: &[ResultRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for record in records {
        let available = if record.available { "true" } else { "false" };
        let fields = [
            escape_field(&record.name),
            escape_field(&record.suffix),
            escape_field(&record.domain),
            available.to_string(),
            escape_field(&record.info),
        ];
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }

    out
}

fn escape_field(value: &str) -> String {
    if value.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
