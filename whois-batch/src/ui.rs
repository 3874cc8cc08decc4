//! Console output for the whois-batch CLI: the run header, one tagged line
//! per result and the closing summary.

use console::{pad_str, style, Alignment};
use std::path::Path;
use whois_batch_lib::{ExportFormat, ResultRecord, ResultSink, RunSummary};

const DOMAIN_WIDTH: usize = 30;

/// Prints each retained result as soon as the collector accepts it.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ResultSink for ConsoleReporter {
    fn on_result(&mut self, record: &ResultRecord) {
        println!("{}", format_result_line(record));
    }
}

/// Format a single result: tag, padded domain, dimmed info.
pub fn format_result_line(record: &ResultRecord) -> String {
    let padded = pad_str(&record.domain, DOMAIN_WIDTH, Alignment::Left, None);
    let tag = if record.available {
        style("[FREE] ").green().bold()
    } else {
        style("[TAKEN]").red().bold()
    };

    format!("{} {}  {}", tag, padded, style(&record.info).dim())
}

pub fn print_header(total: usize, names: usize, suffixes: usize, delay: f64) {
    println!(
        "{}",
        style(format!(
            "Checking {} combinations ({} names × {} suffixes) with delay={}s ...",
            total, names, suffixes, delay
        ))
        .bold()
    );
}

pub fn print_saved(format: ExportFormat, path: &Path) {
    println!("{} {}", style(format!("Saved {}:", format)).dim(), path.display());
}

pub fn print_summary(summary: &RunSummary) {
    println!(
        "Done in {:.1} s — records: {} (of {}).",
        summary.duration.as_secs_f64(),
        style(summary.records.len()).bold(),
        summary.total,
    );
    println!(
        "  {} free | {} taken",
        style(summary.available_count()).green().bold(),
        style(summary.taken_count()).red().bold(),
    );
}
