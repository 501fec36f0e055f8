//! `agent-otel` — OpenTelemetry instrumentation adapter for multi-agent
//! conversational runtimes.
//!
//! Converts runtime lifecycle events (session start, agent creation, client
//! creation, model invocations, tool use, generic events) into two
//! correlated streams: structured JSON log records and distributed-tracing
//! spans with explicit, caller-supplied time windows.
//!
//! # Fault containment
//!
//! Instrumentation must never take down the host. Every public operation on
//! [`OtelLogger`] swallows its own failures: errors are reported on the log
//! sink's error channel and the call returns normally.
//!
//! # Wiring
//!
//! ```no_run
//! use agent_otel::{init_telemetry, OtelLogger, TelemetryConfig};
//!
//! # fn run() -> anyhow::Result<()> {
//! let cfg = TelemetryConfig::from_env()?;
//! let handles = init_telemetry(&cfg)?;
//! let logger = OtelLogger::new(handles.log_sink, handles.span_sink);
//! let session_id = logger.start();
//! # let _ = session_id;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod emit;
pub mod error;
pub mod guard;
pub mod init;
pub mod logger;
pub mod payload;
pub mod record;
pub mod session;
pub mod source;
pub mod span;
pub mod timestamp;

pub use config::{ExporterKind, TelemetryConfig};
pub use emit::{LogEmitter, LogSink, TracingLogSink};
pub use error::TelemetryError;
pub use init::{init_telemetry, TelemetryHandles};
pub use logger::{ChatCompletion, CompletionResponse, OtelLogger, Usage};
pub use payload::{redact, safe_serialize, OpaqueValue, Payload};
pub use session::SessionId;
pub use source::{NamedSource, Source};
pub use span::{AttrValue, OtelSpanSink, SpanRecord, SpanRecorder, SpanSink};
