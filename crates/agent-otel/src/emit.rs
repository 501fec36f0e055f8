//! The structured log channel.
//!
//! [`LogEmitter`] renders one record per event to a single-line JSON string
//! and submits it through the injected [`LogSink`] at informational severity.
//! Failures anywhere in the build-render-submit chain are reported on the
//! same channel at error severity, tagged with [`ERROR_PREFIX`].

use std::sync::Arc;

use serde::Serialize;

use crate::error::TelemetryError;

/// Tag prefixed to every diagnostic emitted on the error channel.
pub const ERROR_PREFIX: &str = "[agent-otel]";

/// Target under which record bodies are logged, so subscribers can route the
/// event stream separately from the library's own diagnostics.
pub const LOG_TARGET: &str = "agent_events";

/// Local logging channel that receives structured JSON lines.
///
/// Injected into the adapter; production code uses [`TracingLogSink`], tests
/// use a recording double.
pub trait LogSink: Send + Sync {
    /// Submit one record body at informational severity.
    fn info(&self, body: &str);

    /// Submit a diagnostic at error severity.
    fn error(&self, body: &str);

    /// Release any owned output handles (e.g. a file handler). Idempotent;
    /// default is a no-op.
    fn close(&self) {}
}

/// [`LogSink`] that forwards to the `tracing` macros under [`LOG_TARGET`].
///
/// The subscriber installed at process startup (JSON fmt layer + exporter
/// layer) takes it from there; submission never blocks on the exporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn info(&self, body: &str) {
        tracing::info!(target: LOG_TARGET, "{body}");
    }

    fn error(&self, body: &str) {
        tracing::error!(target: LOG_TARGET, "{body}");
    }
}

/// Renders records to JSON and submits them through the sink.
#[derive(Clone)]
pub struct LogEmitter {
    sink: Arc<dyn LogSink>,
}

impl LogEmitter {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Render `record` to a single-line JSON string and submit it.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Serialisation`] if the record cannot be
    /// rendered (callers route this into the fault guard).
    pub fn emit<R: Serialize>(&self, record: &R) -> Result<(), TelemetryError> {
        let body = serde_json::to_string(record)?;
        self.sink.info(&body);
        Ok(())
    }

    /// Render `record` to a single-line JSON string without submitting it.
    /// Used where the same rendered body is also attached to a span before
    /// the log record goes out.
    pub fn render<R: Serialize>(&self, record: &R) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string(record)?)
    }

    /// Submit an already-rendered body at informational severity.
    pub fn submit(&self, body: &str) {
        self.sink.info(body);
    }

    /// Report an operation failure on the error channel.
    pub fn report_failure(&self, operation: &str, err: &TelemetryError) {
        self.sink
            .error(&format!("{ERROR_PREFIX} failed to {operation}: {err}"));
    }

    /// Close the underlying sink's owned handles.
    pub fn close(&self) {
        self.sink.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingLogSink {
        pub infos: Mutex<Vec<String>>,
        pub errors: Mutex<Vec<String>>,
    }

    impl LogSink for RecordingLogSink {
        fn info(&self, body: &str) {
            self.infos.lock().unwrap().push(body.to_owned());
        }

        fn error(&self, body: &str) {
            self.errors.lock().unwrap().push(body.to_owned());
        }
    }

    #[derive(serde::Serialize)]
    struct Probe {
        name: &'static str,
    }

    #[test]
    fn emit_submits_single_line_json() {
        let sink = Arc::new(RecordingLogSink::default());
        let emitter = LogEmitter::new(sink.clone());
        emitter.emit(&Probe { name: "x" }).unwrap();
        let infos = sink.infos.lock().unwrap();
        assert_eq!(infos.len(), 1);
        assert!(!infos[0].contains('\n'));
        let v: serde_json::Value = serde_json::from_str(&infos[0]).unwrap();
        assert_eq!(v["name"], "x");
    }

    #[test]
    fn report_failure_carries_prefix_and_operation() {
        let sink = Arc::new(RecordingLogSink::default());
        let emitter = LogEmitter::new(sink.clone());
        emitter.report_failure(
            "log chat completion",
            &TelemetryError::MissingField("usage"),
        );
        let errors = sink.errors.lock().unwrap();
        assert!(errors[0].starts_with(ERROR_PREFIX));
        assert!(errors[0].contains("log chat completion"));
        assert!(errors[0].contains("usage"));
    }
}
