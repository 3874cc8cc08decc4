//! Self-contained HTML report.

use crate::types::ResultRecord;
use chrono::Local;

pub const DEFAULT_HTML_TITLE: &str = "Domain check results";

const STYLE: &str = "\
body{font-family:Arial,Helvetica,sans-serif;padding:16px}
table{border-collapse:collapse;width:100%}
th,td{border:1px solid #ddd;padding:8px;text-align:left}
th{background:#f4f4f4}
.free{background:#e6ffed;color:#034d21}
.taken{background:#ffecec;color:#6b0000}
.mono{font-family:monospace}";

/// Render records as an HTML page with inline CSS.
///
/// The Available cell carries class `free` or `taken`. The page includes
/// the local time it was generated.
pub fn render_html(records: &[ResultRecord], title: &str) -> String {
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    render_html_at(records, title, &generated)
}

fn render_html_at(records: &[ResultRecord], title: &str, generated: &str) -> String {
    let title = escape_html(title);
    let mut lines = vec![
        "<!doctype html>".to_string(),
        "<html><head><meta charset='utf-8'>".to_string(),
        format!("<title>{}</title>", title),
        "<style>".to_string(),
        STYLE.to_string(),
        "</style></head><body>".to_string(),
        format!("<h1>{}</h1>", title),
        format!("<p>Generated: {}</p>", escape_html(generated)),
        "<table>".to_string(),
        "<thead><tr><th>Name</th><th>Suffix</th><th>Domain</th><th>Available</th><th>Info</th></tr></thead>"
            .to_string(),
        "<tbody>".to_string(),
    ];

    for record in records {
        let (class, label) = if record.available {
            ("free", "YES")
        } else {
            ("taken", "NO")
        };
        lines.push(format!(
            "<tr><td>{}</td><td>{}</td><td class='mono'>{}</td><td class='{}'>{}</td><td>{}</td></tr>",
            escape_html(&record.name),
            escape_html(&record.suffix),
            escape_html(&record.domain),
            class,
            label,
            escape_html(&record.info),
        ));
    }

    lines.push("</tbody></table></body></html>".to_string());
    lines.join("\n")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Verdict, WorkItem};

    fn sample() -> Vec<ResultRecord> {
        vec![
            ResultRecord::new(WorkItem::new("foo", ".test"), Verdict::taken("registered (FOO.TEST)")),
            ResultRecord::new(
                WorkItem::new("bar", ".test"),
                Verdict::available("exception indicated free: No match for <bar.test>"),
            ),
        ]
    }

    #[test]
    fn test_rows_styled_by_availability() {
        let html = render_html_at(&sample(), DEFAULT_HTML_TITLE, "2024-05-01 10:00:00");

        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Domain check results</title>"));
        assert!(html.contains("<p>Generated: 2024-05-01 10:00:00</p>"));
        assert!(html.contains("<th>Name</th><th>Suffix</th><th>Domain</th><th>Available</th><th>Info</th>"));
        assert!(html.contains("<td class='mono'>foo.test</td><td class='taken'>NO</td>"));
        assert!(html.contains("<td class='mono'>bar.test</td><td class='free'>YES</td>"));
        assert_eq!(html.matches("<tr><td>").count(), 2);
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let html = render_html_at(&sample(), "A & B", "now");
        assert!(html.contains("No match for &lt;bar.test&gt;"));
        assert!(html.contains("<h1>A &amp; B</h1>"));
        assert!(!html.contains("<bar.test>"));
    }

    #[test]
    fn test_generated_timestamp_format() {
        let html = render_html(&[], DEFAULT_HTML_TITLE);
        let line = html
            .lines()
            .find(|l| l.starts_with("<p>Generated: "))
            .unwrap();
        let stamp = line
            .trim_start_matches("<p>Generated: ")
            .trim_end_matches("</p>");
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
