use chrono::{DateTime, Utc};
use serde_json::Value;

/// Source of "now" for the population scheduler.
pub trait Clock {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Writes simulation snapshots to a sink (files, streams, etc.).
pub trait SnapshotWriter {
    /// Writes a single snapshot and returns the number of bytes written.
    fn write_snapshot(&mut self, snapshot: &Value) -> std::io::Result<u64>;
    /// Flushes buffered data without closing the writer.
    fn flush(&mut self) -> std::io::Result<()>;
    /// Closes the writer, flushing any remaining data.
    fn close(&mut self) -> std::io::Result<()>;
}
