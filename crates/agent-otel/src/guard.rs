//! The fault-containment discipline for every public operation.
//!
//! Telemetry must never take down the host: any failure while building or
//! emitting a record (malformed timestamp, missing field, serialisation
//! error, stopped logger) is reported on the emitter's error channel and the
//! operation returns to the caller as if it had completed. This combinator
//! is the single place that policy lives; operations call through it instead
//! of repeating catch-log-and-continue bodies.

use crate::emit::LogEmitter;
use crate::error::TelemetryError;

/// Run `body`; on error, report it through `emitter` and return normally.
///
/// `operation` names the public operation for the diagnostic message, e.g.
/// `"log chat completion"`.
pub fn guard<F>(emitter: &LogEmitter, operation: &str, body: F)
where
    F: FnOnce() -> Result<(), TelemetryError>,
{
    if let Err(e) = body() {
        emitter.report_failure(operation, &e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{LogSink, ERROR_PREFIX};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingLogSink {
        infos: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl LogSink for RecordingLogSink {
        fn info(&self, body: &str) {
            self.infos.lock().unwrap().push(body.to_owned());
        }

        fn error(&self, body: &str) {
            self.errors.lock().unwrap().push(body.to_owned());
        }
    }

    #[test]
    fn success_reports_nothing() {
        let sink = Arc::new(RecordingLogSink::default());
        let emitter = LogEmitter::new(sink.clone());
        guard(&emitter, "log event", || Ok(()));
        assert!(sink.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn failure_is_reported_and_contained() {
        let sink = Arc::new(RecordingLogSink::default());
        let emitter = LogEmitter::new(sink.clone());
        guard(&emitter, "log event", || {
            Err(TelemetryError::MalformedTimestamp("bogus".into()))
        });
        let errors = sink.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with(ERROR_PREFIX));
        assert!(errors[0].contains("log event"));
        assert!(errors[0].contains("bogus"));
    }

    #[test]
    fn one_failure_does_not_affect_later_calls() {
        let sink = Arc::new(RecordingLogSink::default());
        let emitter = LogEmitter::new(sink.clone());
        guard(&emitter, "first", || Err(TelemetryError::MissingField("x")));
        guard(&emitter, "second", || {
            emitter.emit(&serde_json::json!({"ok": true}))
        });
        assert_eq!(sink.errors.lock().unwrap().len(), 1);
        assert_eq!(sink.infos.lock().unwrap().len(), 1);
    }
}
