//! Span construction with explicit, caller-supplied instants.
//!
//! The operations being recorded (model calls, tool invocations) happened in
//! the past relative to when the logging code runs. Spans therefore carry the
//! *actual* operation window — start parsed from the event's timestamp
//! string, end defaulting to "now" at recording time — rather than the
//! logging call's own wall-clock window. Without this, downstream latency
//! analysis would measure the instrumentation instead of the operation.

use std::sync::Arc;
use std::time::SystemTime;

use opentelemetry::trace::{Span, Tracer};
use opentelemetry::KeyValue;

use crate::error::TelemetryError;
use crate::timestamp::parse_timestamp;

/// Scalar span attribute value. Attributes are flat; nested payloads are
/// pre-rendered to JSON strings before they reach a span.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<AttrValue> for opentelemetry::Value {
    fn from(v: AttrValue) -> Self {
        match v {
            AttrValue::Str(s) => s.into(),
            AttrValue::Int(i) => i.into(),
            AttrValue::Float(f) => f.into(),
            AttrValue::Bool(b) => b.into(),
        }
    }
}

/// A completed span ready for hand-off to the tracing backend.
///
/// Invariant: `end >= start`.
#[derive(Debug, Clone)]
pub struct SpanRecord {
    pub name: String,
    pub start: SystemTime,
    pub end: SystemTime,
    pub attributes: Vec<(String, AttrValue)>,
}

/// Destination for completed spans. Injected into the adapter so the span
/// path is testable without a live exporter.
pub trait SpanSink: Send + Sync {
    /// Hand a completed span to the backend. Fire-and-forget: any buffering
    /// or retry toward the exporter happens behind this call.
    fn record(&self, span: SpanRecord);
}

/// [`SpanSink`] backed by an OpenTelemetry tracer.
///
/// Opens each span with an explicit start instant and ends it with an
/// explicit end instant; the batch processor behind the tracer ships it
/// off-process without blocking the caller.
pub struct OtelSpanSink<T> {
    tracer: T,
}

impl<T> OtelSpanSink<T> {
    pub fn new(tracer: T) -> Self {
        Self { tracer }
    }
}

impl<T> SpanSink for OtelSpanSink<T>
where
    T: Tracer + Send + Sync,
{
    fn record(&self, span: SpanRecord) {
        let attributes: Vec<KeyValue> = span
            .attributes
            .into_iter()
            .map(|(k, v)| KeyValue::new(k, opentelemetry::Value::from(v)))
            .collect();
        let builder = self
            .tracer
            .span_builder(span.name)
            .with_start_time(span.start)
            .with_attributes(attributes);
        let mut otel_span = self.tracer.build(builder);
        otel_span.end_with_timestamp(span.end);
    }
}

/// Builds [`SpanRecord`]s from caller-supplied timestamp strings and hands
/// them to the injected sink.
#[derive(Clone)]
pub struct SpanRecorder {
    sink: Arc<dyn SpanSink>,
}

impl SpanRecorder {
    pub fn new(sink: Arc<dyn SpanSink>) -> Self {
        Self { sink }
    }

    /// Record one span.
    ///
    /// `start_ts` / `end_ts` are wire-format timestamp strings; either may be
    /// absent, in which case the recorder's own clock is used. A reversed
    /// window is clamped so that `end >= start` always holds.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::MalformedTimestamp`] if a supplied timestamp
    /// string does not parse.
    pub fn record_span(
        &self,
        name: impl Into<String>,
        start_ts: Option<&str>,
        end_ts: Option<&str>,
        attributes: Vec<(String, AttrValue)>,
    ) -> Result<(), TelemetryError> {
        let start = match start_ts {
            Some(s) => parse_timestamp(s)?,
            None => SystemTime::now(),
        };
        let end = match end_ts {
            Some(s) => parse_timestamp(s)?,
            None => SystemTime::now(),
        };
        let end = end.max(start);
        self.sink.record(SpanRecord {
            name: name.into(),
            start,
            end,
            attributes,
        });
        Ok(())
    }
}
