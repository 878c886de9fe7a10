//! OpenTelemetry pipeline for the gateway's own signals.
//!
//! One OTLP/HTTP JSON exporter per signal endpoint:
//! - spans from `tracing` via `tracing-opentelemetry`, batched
//! - log events via the appender bridge, batched (size or interval)
//! - business counters via a periodic reader, cumulative sums
//!
//! Only INFO-and-above spans and events from this crate and the `ui` target
//! are exported. The SDK and HTTP client report under their own targets, so
//! export failures never feed back into the pipeline.

use std::time::Duration;

use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, MetricExporter, Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::logs::{BatchConfigBuilder, BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::config::TelemetryConfig;
use crate::observability::counters::METER_NAME;

/// Target used for browser-originated log lines.
pub const UI_TARGET: &str = "ui";

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP {signal} exporter: {reason}")]
    Exporter { signal: &'static str, reason: String },
}

fn exporter_error<E: std::fmt::Display>(signal: &'static str) -> impl FnOnce(E) -> TelemetryError {
    move |e| TelemetryError::Exporter {
        signal,
        reason: e.to_string(),
    }
}

/// `service.name` plus `deployment.environment`, on top of the SDK defaults.
pub fn resource(config: &TelemetryConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new(
            "deployment.environment",
            config.deployment_environment.clone(),
        ))
        .build()
}

fn exportable_target(level: &Level, target: &str) -> bool {
    // tracing orders levels by verbosity: TRACE > DEBUG > INFO
    *level <= Level::INFO && (target == UI_TARGET || target.starts_with(CRATE_TARGET))
}

fn exportable(metadata: &Metadata<'_>) -> bool {
    exportable_target(metadata.level(), metadata.target())
}

/// Tracer, meter and logger providers, each bound to its collector endpoint.
pub struct TelemetryProviders {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
    logger: SdkLoggerProvider,
}

impl TelemetryProviders {
    /// Build the exporters and providers, and register the tracer and meter
    /// providers globally.
    pub fn install(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let timeout = Duration::from_secs(config.relay_timeout_secs);
        let resource = resource(config);

        let spans = SpanExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpJson)
            .with_endpoint(config.traces_url())
            .with_timeout(timeout)
            .build()
            .map_err(exporter_error("traces"))?;
        let tracer = SdkTracerProvider::builder()
            .with_resource(resource.clone())
            .with_batch_exporter(spans)
            .build();

        let metrics = MetricExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpJson)
            .with_endpoint(config.metrics_url())
            .with_timeout(timeout)
            .build()
            .map_err(exporter_error("metrics"))?;
        let reader = PeriodicReader::builder(metrics)
            .with_interval(Duration::from_secs(config.metrics_export_interval_secs))
            .build();
        let meter = SdkMeterProvider::builder()
            .with_resource(resource.clone())
            .with_reader(reader)
            .build();

        let logs = LogExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpJson)
            .with_endpoint(config.logs_url())
            .with_timeout(timeout)
            .build()
            .map_err(exporter_error("logs"))?;
        let batching = BatchConfigBuilder::default()
            .with_max_export_batch_size(config.logs_batch_size)
            .with_scheduled_delay(Duration::from_secs(config.logs_flush_interval_secs))
            .build();
        let logger = SdkLoggerProvider::builder()
            .with_resource(resource)
            .with_log_processor(BatchLogProcessor::builder(logs).with_batch_config(batching).build())
            .build();

        global::set_tracer_provider(tracer.clone());
        global::set_meter_provider(meter.clone());

        Ok(Self {
            tracer,
            meter,
            logger,
        })
    }

    /// Meter for the business counters.
    pub fn meter(&self) -> Meter {
        self.meter.meter(METER_NAME)
    }

    /// Span and log bridges into the providers, restricted to exportable
    /// spans and events.
    pub fn layer<S>(&self) -> impl Layer<S> + Send + Sync + 'static
    where
        S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
    {
        let spans = tracing_opentelemetry::layer().with_tracer(self.tracer.tracer(METER_NAME));
        let logs = OpenTelemetryTracingBridge::new(&self.logger);
        spans.and_then(logs).with_filter(filter_fn(exportable))
    }

    /// Flush pending data and stop every pipeline.
    ///
    /// Blocks until the exporters have finished; call from a blocking context.
    pub fn shutdown(self) {
        let results = [
            ("traces", self.tracer.shutdown().map_err(|e| e.to_string())),
            ("metrics", self.meter.shutdown().map_err(|e| e.to_string())),
            ("logs", self.logger.shutdown().map_err(|e| e.to_string())),
        ];
        for (signal, result) in results {
            if let Err(e) = result {
                tracing::warn!(signal, error = %e, "Telemetry pipeline did not shut down cleanly");
            }
        }
    }
}
