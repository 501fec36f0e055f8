//! Configuration loading for the telemetry pipeline.
//!
//! All values are read from environment variables at construction. Exporter
//! selection is deliberately forgiving: an unrecognised backend name, or the
//! managed backend without its connection string, falls back to the OTLP
//! default instead of failing construction — telemetry configuration must
//! never be fatal to the host.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// Recognised exporter backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExporterKind {
    /// Standard OTLP/gRPC exporter (default).
    Otlp,
    /// Managed backend addressed through an Application Insights
    /// connection string.
    AzureMonitor,
}

/// Validated telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Exporter backend selector: `"otlp"` or `"azure_monitor"`.
    #[serde(default = "default_exporter_type")]
    pub exporter_type: String,

    /// OTLP collector endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub otel_exporter_otlp_endpoint: String,

    /// Connection string for the managed backend. Required only when
    /// `exporter_type` is `"azure_monitor"`.
    #[serde(default)]
    pub applicationinsights_connection_string: Option<String>,

    /// `service.name` resource attribute on exported spans.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_exporter_type() -> String {
    "otlp".into()
}
fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}
fn default_service_name() -> String {
    "agent-runtime".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            exporter_type: default_exporter_type(),
            otel_exporter_otlp_endpoint: default_otlp_endpoint(),
            applicationinsights_connection_string: None,
            service_name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error only if the environment source cannot be read; an
    /// unrecognised exporter selection is resolved by fallback, not failure.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        cfg.try_deserialize()
            .context("failed to deserialise telemetry configuration")
    }

    /// Resolve the effective exporter backend.
    ///
    /// Unrecognised values fall back to [`ExporterKind::Otlp`], as does the
    /// managed backend when its connection string is absent.
    pub fn exporter_kind(&self) -> ExporterKind {
        match self.exporter_type.as_str() {
            "otlp" => ExporterKind::Otlp,
            "azure_monitor" => {
                if self.applicationinsights_connection_string.is_some() {
                    ExporterKind::AzureMonitor
                } else {
                    warn!(
                        "azure_monitor selected without a connection string; \
                         falling back to otlp"
                    );
                    ExporterKind::Otlp
                }
            }
            other => {
                warn!(exporter_type = other, "unrecognised exporter type; falling back to otlp");
                ExporterKind::Otlp
            }
        }
    }
}
