//! Error types for the instrumentation layer.
//!
//! None of these ever cross the adapter's public boundary: every failure is
//! intercepted by the fault guard and reported on the diagnostic channel, and
//! the public operation returns normally.

use thiserror::Error;

/// Failures raised while building or emitting telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A timestamp string did not match `YYYY-MM-DD HH:MM:SS.ffffff`.
    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    /// A record could not be rendered to JSON.
    #[error("record serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// An input lacked a field the record schema requires.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The logger has already been stopped; the call is degraded silently.
    #[error("logger is stopped")]
    Stopped,
}
