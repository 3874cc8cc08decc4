//! Collection of finished results.
//!
//! The collector is driven by a single consumer (the dispatcher's receive
//! loop), so records are handled strictly one at a time in completion order.

use crate::types::ResultRecord;

/// Receives each retained record as soon as it is collected.
pub trait ResultSink {
    fn on_result(&mut self, record: &ResultRecord);
}

/// A sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn on_result(&mut self, _record: &ResultRecord) {}
}

impl<F> ResultSink for F
where
    F: FnMut(&ResultRecord),
{
    fn on_result(&mut self, record: &ResultRecord) {
        self(record)
    }
}

/// Applies the free-only filter, accumulates records for export and feeds
/// the live sink.
pub struct ResultCollector<S: ResultSink> {
    only_free: bool,
    records: Vec<ResultRecord>,
    received: usize,
    sink: S,
}

impl<S: ResultSink> ResultCollector<S> {
    pub fn new(only_free: bool, sink: S) -> Self {
        Self {
            only_free,
            records: Vec::new(),
            received: 0,
            sink,
        }
    }

    /// Handle one finished record.
    ///
    /// Taken domains are dropped entirely when `only_free` is set. Anything
    /// else is stored and passed to the sink before this returns.
    /// Returns whether the record was retained.
    pub fn accept(&mut self, record: ResultRecord) -> bool {
        self.received += 1;

        if self.only_free && !record.available {
            return false;
        }

        self.sink.on_result(&record);
        self.records.push(record);
        true
    }

    /// Records seen so far, including filtered ones.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Retained records, in completion order.
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }
}
