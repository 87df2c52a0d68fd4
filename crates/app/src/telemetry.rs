use std::{
    fmt,
    sync::{Mutex, OnceLock},
    time::Instant,
};

use metrics::{counter, describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{
    fmt::{self as tracing_fmt, time::UtcTime},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use todo_api_util::{AppConfig, Environment};

use crate::service::ServiceError;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");
const REQUESTS_TOTAL: &str = "todo_requests_total";

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();
static RECORDER_GUARD: Mutex<()> = Mutex::new(());
static STARTED_AT: OnceLock<Instant> = OnceLock::new();

#[derive(Debug)]
pub enum TelemetryError {
    Tracing(TryInitError),
    Metrics(BuildError),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracing(err) => write!(f, "failed to initialize tracing: {err}"),
            Self::Metrics(err) => write!(f, "failed to initialize prometheus recorder: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {}

/// Installs the global subscriber: pretty output outside production, JSON
/// lines in production. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryError> {
    if TRACING_INIT.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = tracing_fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339());
    let fmt_layer = match config.environment {
        Environment::Production => base.json().boxed(),
        Environment::Development | Environment::Test => base.pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(TelemetryError::Tracing)?;

    TRACING_INIT.set(()).ok();
    tracing::info!(
        stage = "telemetry",
        env = %config.environment.as_str(),
        version = BUILD_VERSION,
        "tracing initialized"
    );
    Ok(())
}

/// Installs the Prometheus recorder once per process and returns its handle.
pub fn init_metrics() -> Result<PrometheusHandle, TelemetryError> {
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }

    let _guard = RECORDER_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(TelemetryError::Metrics)?;
    RECORDER.set(handle.clone()).ok();

    describe_gauge!("app_build_info", "Build metadata for the running binary");
    describe_gauge!("app_uptime_seconds", "Seconds since the process started");
    describe_counter!(
        REQUESTS_TOTAL,
        "Count of todo service operations, labelled by operation and result"
    );
    STARTED_AT.get_or_init(Instant::now);

    Ok(handle)
}

/// Counts one todo operation and hands the result back unchanged.
pub fn observe<T>(op: &'static str, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.metric_label(),
    };
    counter!(REQUESTS_TOTAL, "op" => op, "result" => outcome).increment(1);
    result
}

/// Renders the registry followed by build and uptime gauges.
pub fn render_metrics(handle: &PrometheusHandle) -> String {
    let mut body = handle.render();
    if !body.is_empty() && !body.ends_with('\n') {
        body.push('\n');
    }

    let uptime = STARTED_AT
        .get()
        .map(|start| start.elapsed().as_secs_f64())
        .unwrap_or_default();
    body.push_str(&format!(
        "# TYPE app_build_info gauge\napp_build_info{{version=\"{BUILD_VERSION}\"}} 1\n\
         # TYPE app_uptime_seconds gauge\napp_uptime_seconds {uptime}\n"
    ));

    body
}
