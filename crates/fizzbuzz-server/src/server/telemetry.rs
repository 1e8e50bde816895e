//! # Telemetry
//!
//! Logs always go to the console through `tracing_subscriber::fmt`, either
//! human-readable or as JSON lines (`LOG_JSON`). OpenTelemetry export is
//! optional and selected at compile time.
//!
//! ## Feature matrix
//!
//! - `traces`: export request spans through OpenTelemetry.
//! - `metrics`: export request counters, durations and stats gauges.
//! - `otlp`: OTLP/gRPC exporter pointed at `OTEL_EXPORTER_OTLP_ENDPOINT`.
//! - `stdout`: stdout exporter, useful locally.
//!
//! Exporters require at least one of `traces` or `metrics`; both exporters may
//! be enabled together.
//!
//! ```bash
//! cargo run -p fizzbuzz-server --features traces,metrics,stdout
//! ```
//!
//! ## Metric handles
//!
//! | Name                         | Kind      | Attributes |
//! |------------------------------|-----------|------------|
//! | `fizzbuzz_requests`          | counter   | `status`   |
//! | `fizzbuzz_request_duration`  | histogram | `status`   |
//! | `fizzbuzz_result_size`       | histogram |            |
//! | `stats_requests`             | counter   | `status`   |
//! | `stats_request_duration`     | histogram | `status`   |
//! | `stats_entries`              | gauge     |            |
//! | `most_frequent_request_hits` | gauge     |            |
//!
//! The recording helpers at the bottom of this module compile to no-ops when
//! `metrics` is disabled, so handlers call them unconditionally.

#[cfg(all(feature = "otlp", not(any(feature = "traces", feature = "metrics"))))]
compile_error!("The 'otlp' feature requires at least one of 'traces' or 'metrics' to be enabled.");

#[cfg(all(
    feature = "stdout",
    not(any(feature = "traces", feature = "metrics"))
))]
compile_error!("The 'stdout' feature requires at least one of 'traces' or 'metrics' to be enabled.");

use crate::server::config::ServerConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(all(feature = "otlp", any(feature = "metrics", feature = "traces")))]
use opentelemetry_otlp::WithExportConfig;
#[cfg(all(feature = "otlp", feature = "metrics"))]
use opentelemetry_sdk::metrics::Temporality;

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(any(feature = "metrics", feature = "traces"))]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(any(feature = "metrics", feature = "traces"))]
use opentelemetry_sdk::Resource;
#[cfg(any(feature = "metrics", feature = "traces"))]
use opentelemetry_semantic_conventions as semvcns;

#[cfg(feature = "traces")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "traces")]
use opentelemetry_sdk::propagation::TraceContextPropagator;
#[cfg(feature = "traces")]
use opentelemetry_sdk::trace as sdktrace;

/// Exporter providers that must be flushed before the process exits.
pub struct TelemetryProviders {
    #[cfg(feature = "traces")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

pub fn init_telemetry(config: &ServerConfig) -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "traces")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "traces")]
    let tracer_provider = init_tracer(config)?;

    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics(config)?;

    #[cfg(any(feature = "metrics", feature = "traces"))]
    let scope = InstrumentationScope::builder("fizzbuzz-server")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url(semvcns::SCHEMA_URL)
        .build();

    let pretty = (!config.log_json).then(|| {
        fmt::layer()
            .with_thread_ids(true)
            .with_line_number(true)
            .with_target(false)
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .with_file(true)
            .pretty()
    });
    let json = config.log_json.then(|| {
        fmt::layer()
            .with_thread_ids(true)
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .json()
    });

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(pretty)
        .with(json);

    #[cfg(feature = "traces")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope.clone()))
                .with_error_records_to_exceptions(true),
        )
    };

    #[cfg(feature = "metrics")]
    let registry = {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);

        registry.with(tracing_opentelemetry::MetricsLayer::new(
            meter_provider.clone(),
        ))
    };

    registry.try_init()?;
    tracing::debug!(
        service = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        "telemetry initialized"
    );

    Ok(TelemetryProviders {
        #[cfg(feature = "traces")]
        tracer_provider,
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

impl TelemetryProviders {
    /// Flushes and shuts down every exporter. Errors are reported on stderr
    /// since the subscriber may already be gone.
    pub fn shutdown(self) {
        #[cfg(feature = "traces")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {err:#?}");
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {err:#?}");
            }
        }

        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

#[cfg(any(feature = "metrics", feature = "traces"))]
fn resource(config: &ServerConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics(config: &ServerConfig) -> anyhow::Result<sdkmetrics::SdkMeterProvider> {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource(config));

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(10))
            .build();

        builder.with_reader(reader)
    };

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;

        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(config.otlp_endpoint.clone())
            .with_timeout(std::time::Duration::from_secs(10))
            .with_temporality(Temporality::Cumulative)
            .build()
            .context("failed to build metrics exporter")?;

        builder.with_periodic_exporter(exporter)
    };

    Ok(builder.build())
}

#[cfg(feature = "traces")]
fn init_tracer(config: &ServerConfig) -> anyhow::Result<sdktrace::SdkTracerProvider> {
    let builder = sdktrace::SdkTracerProvider::builder().with_resource(resource(config));

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::SpanExporter;
        let exporter = SpanExporter::default();
        let batch = sdktrace::BatchSpanProcessor::builder(exporter)
            .with_batch_config(
                sdktrace::BatchConfigBuilder::default()
                    .with_scheduled_delay(std::time::Duration::from_secs(5))
                    .with_max_queue_size(2048)
                    .build(),
            )
            .build();
        builder.with_span_processor(batch)
    };

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.otlp_endpoint.clone())
            .with_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build tracer exporter")?;

        let batch = sdktrace::BatchSpanProcessor::builder(exporter)
            .with_batch_config(
                sdktrace::BatchConfigBuilder::default()
                    .with_scheduled_delay(std::time::Duration::from_secs(5))
                    .with_max_queue_size(2048)
                    .build(),
            )
            .build();

        builder.with_span_processor(batch)
    };

    Ok(builder.build())
}

#[cfg(feature = "metrics")]
static FIZZBUZZ_REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static FIZZBUZZ_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static FIZZBUZZ_RESULT_SIZE: OnceLock<Histogram<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static STATS_REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static STATS_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static STATS_ENTRIES: OnceLock<Gauge<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static MOST_FREQUENT_HITS: OnceLock<Gauge<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = FIZZBUZZ_REQUESTS.set(
        meter
            .u64_counter("fizzbuzz_requests")
            .with_description("Total fizzbuzz requests")
            .build(),
    );

    let _ = FIZZBUZZ_DURATION_MS.set(
        meter
            .f64_histogram("fizzbuzz_request_duration")
            .with_unit("ms")
            .with_description("Fizzbuzz request duration")
            .build(),
    );

    let _ = FIZZBUZZ_RESULT_SIZE.set(
        meter
            .u64_histogram("fizzbuzz_result_size")
            .with_description("Elements per fizzbuzz response")
            .with_boundaries(vec![10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0])
            .build(),
    );

    let _ = STATS_REQUESTS.set(
        meter
            .u64_counter("stats_requests")
            .with_description("Total stats requests")
            .build(),
    );

    let _ = STATS_DURATION_MS.set(
        meter
            .f64_histogram("stats_request_duration")
            .with_unit("ms")
            .with_description("Stats request duration")
            .build(),
    );

    let _ = STATS_ENTRIES.set(
        meter
            .u64_gauge("stats_entries")
            .with_description("Distinct parameter sets tracked")
            .build(),
    );

    let _ = MOST_FREQUENT_HITS.set(
        meter
            .u64_gauge("most_frequent_request_hits")
            .with_description("Hit count of the most frequent parameter set")
            .build(),
    );
}

#[cfg(feature = "metrics")]
pub fn record_fizzbuzz_request(status: &'static str, duration_ms: f64) {
    let attributes = [KeyValue::new("status", status)];
    if let Some(counter) = FIZZBUZZ_REQUESTS.get() {
        counter.add(1, &attributes);
    }
    if let Some(histogram) = FIZZBUZZ_DURATION_MS.get() {
        histogram.record(duration_ms, &attributes);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_fizzbuzz_request(_status: &'static str, _duration_ms: f64) {}

#[cfg(feature = "metrics")]
pub fn record_result_size(size: usize) {
    if let Some(histogram) = FIZZBUZZ_RESULT_SIZE.get() {
        histogram.record(size as u64, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_result_size(_size: usize) {}

#[cfg(feature = "metrics")]
pub fn record_stats_request(status: &'static str, duration_ms: f64) {
    let attributes = [KeyValue::new("status", status)];
    if let Some(counter) = STATS_REQUESTS.get() {
        counter.add(1, &attributes);
    }
    if let Some(histogram) = STATS_DURATION_MS.get() {
        histogram.record(duration_ms, &attributes);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_stats_request(_status: &'static str, _duration_ms: f64) {}

#[cfg(feature = "metrics")]
pub fn set_stats_entries(entries: usize) {
    if let Some(gauge) = STATS_ENTRIES.get() {
        gauge.record(entries as u64, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn set_stats_entries(_entries: usize) {}

#[cfg(feature = "metrics")]
pub fn set_most_frequent_hits(hits: u64) {
    if let Some(gauge) = MOST_FREQUENT_HITS.get() {
        gauge.record(hits, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn set_most_frequent_hits(_hits: u64) {}
