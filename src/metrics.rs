use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and register the service metrics.
/// The returned handle renders the text/plain scrape payload.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
/// Used by tests, which build many routers in one process.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn register_metrics() {
    // Pre-register so they appear before the first increment.
    counter!("etherscan_requests_total").absolute(0);
    counter!("etherscan_errors_total", "kind" => "transport").absolute(0);
    counter!("etherscan_errors_total", "kind" => "upstream").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("etherscan_request_seconds").record(0.0);
}
