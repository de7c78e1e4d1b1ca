//! # Diagnostics
//!
//! Advisory events raised while rewriting. They never change control flow.

use tracing::debug;

/// Receives rewrite events.
pub trait DiagnosticsSink: Send + Sync {
    /// A requested field was found in `record`.
    fn field_detected(&self, record: &str, field: &str);

    /// `fields` of `record` were requested but never found.
    fn fields_not_updated(&self, record: &str, fields: &[&str]);
}

/// Emits events through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn field_detected(&self, record: &str, field: &str) {
        debug!(
            target: "tagsmith::tags",
            component = "tags_writer",
            record,
            field,
            "detected field"
        );
    }

    fn fields_not_updated(&self, record: &str, fields: &[&str]) {
        debug!(
            target: "tagsmith::tags",
            component = "tags_writer",
            record,
            fields = ?fields,
            "some fields haven't been updated"
        );
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn field_detected(&self, _record: &str, _field: &str) {}

    fn fields_not_updated(&self, _record: &str, _fields: &[&str]) {}
}
