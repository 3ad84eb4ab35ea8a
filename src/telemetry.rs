use anyhow::Result;
use std::time::Instant;

use once_cell::sync::OnceCell;
use opentelemetry::{
    global,
    metrics::{Histogram, Meter, MeterProvider},
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{metrics::SdkMeterProvider, resource::Resource, trace::SdkTracerProvider};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

const COMMIT_ENV: &str = "VP_COMMIT_SHA";

pub struct Telemetry {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
    pub meter: Meter,
    pub quote_latency_ms: Histogram<f64>,
    pub invariant_error_rel: Histogram<f64>,
}

impl Telemetry {
    pub fn shutdown(&self) {
        let _ = self.meter_provider.force_flush();
        let _ = self.meter_provider.shutdown();
        let _ = self.tracer_provider.shutdown();
    }
}

fn commit_sha() -> String {
    std::env::var(COMMIT_ENV).unwrap_or_else(|_| "unknown".into())
}

pub fn init(service_name: &str) -> Result<Telemetry> {
    let base = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4318".to_string());
    let traces_ep = std::env::var("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT")
        .unwrap_or_else(|_| format!("{}/v1/traces", base));
    let metrics_ep = std::env::var("OTEL_EXPORTER_OTLP_METRICS_ENDPOINT")
        .unwrap_or_else(|_| format!("{}/v1/metrics", base));

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attributes([
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("git.commit.sha", commit_sha()),
        ])
        .build();

    // ---- Traces (OTLP/HTTP) ----
    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(traces_ep)
        .build()?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    // ---- Métricas (OTLP/HTTP) ----
    let metric_exporter = MetricExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(metrics_ep)
        .build()?;
    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_periodic_exporter(metric_exporter)
        .build();

    // Globais
    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    // tracing -> OTel
    let tracer = tracer_provider.tracer(service_name.to_string());
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let subscriber = Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .with(otel_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    let meter = meter_provider.meter("virtual_pools_core");
    let quote_latency_ms = meter
        .f64_histogram("quote_latency_ms")
        .with_unit("ms")
        .with_description("Latency of a full pool snapshot + quote in ms")
        .build();
    let invariant_error_rel = meter
        .f64_histogram("invariant_error_rel")
        .with_unit("1")
        .with_description("Relative invariant error |terra*luna - base^2| / base^2")
        .build();

    Ok(Telemetry { tracer_provider, meter_provider, meter, quote_latency_ms, invariant_error_rel })
}

/// Cria um `Span` INFO com nome **estático** (exigência do tracing) e
/// coloca o nome dinâmico em `span_name`. Inclui `git_commit_sha`.
pub fn make_info_span(name: &str, op_id: u32, component: &str) -> tracing::Span {
    let commit = commit_sha();
    tracing::span!(
        target: "virtual_pools_core",
        Level::INFO,
        "op",
        git_commit_sha = %commit,
        span_name = %name,
        op_id = op_id,
        component = component
    )
}

// Instrumentos globais: sem provider instalado viram no-op.
static OP_DURATION: OnceCell<Histogram<f64>> = OnceCell::new();
static INVARIANT_ERROR: OnceCell<Histogram<f64>> = OnceCell::new();

fn op_duration() -> &'static Histogram<f64> {
    OP_DURATION.get_or_init(|| {
        global::meter("virtual_pools_core")
            .f64_histogram("op_duration_seconds")
            .with_unit("s")
            .with_description("operation duration")
            .build()
    })
}

fn invariant_error() -> &'static Histogram<f64> {
    INVARIANT_ERROR.get_or_init(|| {
        global::meter("virtual_pools_core")
            .f64_histogram("op_invariant_error_rel")
            .with_unit("1")
            .with_description("relative invariant error per operation")
            .build()
    })
}

/// Mede `f` e registra a duração em `op_duration_seconds{op}`.
pub fn time<F, T>(op: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    let sec = start.elapsed().as_secs_f64();
    op_duration().record(sec, &[KeyValue::new("op", op.to_string())]);
    out
}

pub fn record_invariant_error(op: &str, value: f64) {
    invariant_error().record(value, &[KeyValue::new("op", op.to_string())]);
}
