//! OTEL SDK initialisation: tracing subscriber + OTLP exporter, handing back
//! the sink pair the adapter is constructed with.
//!
//! Exporting is delegated to the SDK's batch processor on the Tokio runtime;
//! a slow or failing collector never blocks a logging call site.

use std::sync::Arc;

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ExporterKind, TelemetryConfig};
use crate::emit::{LogSink, TracingLogSink};
use crate::span::{OtelSpanSink, SpanSink};

/// The injected sinks produced by [`init_telemetry`].
pub struct TelemetryHandles {
    pub log_sink: Arc<dyn LogSink>,
    pub span_sink: Arc<dyn SpanSink>,
}

/// Initialise the global tracing subscriber and OTEL pipeline, returning the
/// sinks to construct an [`OtelLogger`] with.
///
/// Configures:
/// - A JSON-formatted [`tracing_subscriber`] layer for structured log output.
/// - A [`tracing_opentelemetry`] layer that exports spans to the resolved
///   exporter endpoint.
///
/// # Errors
///
/// Returns an error if the OTLP exporter or SDK pipeline cannot be
/// initialised, or if a subscriber is already installed.
///
/// [`OtelLogger`]: crate::logger::OtelLogger
pub fn init_telemetry(cfg: &TelemetryConfig) -> Result<TelemetryHandles> {
    // --- Tracing pipeline ---
    let endpoint = resolve_endpoint(cfg);
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default().with_resource(service_resource(cfg)),
        )
        .install_batch(runtime::Tokio)
        .context("failed to install OTLP tracing pipeline")?;

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer.clone());

    // --- Subscriber ---
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .with(otel_layer)
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(TelemetryHandles {
        log_sink: Arc::new(TracingLogSink),
        span_sink: Arc::new(OtelSpanSink::new(tracer)),
    })
}

/// Endpoint the span exporter ships to, per the resolved backend.
///
/// For the managed backend the ingestion endpoint is lifted out of the
/// connection string; the transport itself stays OTLP — the real ingestion
/// protocol belongs to the exporter collaborator, not this layer.
fn resolve_endpoint(cfg: &TelemetryConfig) -> String {
    match cfg.exporter_kind() {
        ExporterKind::Otlp => cfg.otel_exporter_otlp_endpoint.clone(),
        ExporterKind::AzureMonitor => cfg
            .applicationinsights_connection_string
            .as_deref()
            .and_then(ingestion_endpoint)
            .unwrap_or_else(|| cfg.otel_exporter_otlp_endpoint.clone()),
    }
}

/// Extract `IngestionEndpoint` from an Application Insights connection string
/// (`Key=Value;Key=Value;...`).
fn ingestion_endpoint(connection_string: &str) -> Option<String> {
    connection_string.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("IngestionEndpoint") && !value.trim().is_empty() {
            Some(value.trim().to_owned())
        } else {
            None
        }
    })
}

fn service_resource(cfg: &TelemetryConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            cfg.service_name.clone(),
        ),
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ),
    ])
}
