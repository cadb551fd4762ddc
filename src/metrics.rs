use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

fn init_metric_descriptions() {
    describe_counter!(
        "cost_engine_analysis_requests_total",
        "Total number of analysis requests by outcome"
    );
    describe_counter!(
        "cost_engine_options_omitted_total",
        "Candidate options dropped from results"
    );
    describe_counter!(
        "cost_engine_spot_fallback_total",
        "Spot options priced at on-demand because the spot price was unavailable"
    );
    describe_histogram!(
        "cost_engine_analysis_duration_seconds",
        "Analysis duration in seconds"
    );
    describe_gauge!("cost_engine_info", "Engine version information");

    gauge!("cost_engine_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished analysis request. `outcome` is "ok" or an error type.
pub fn record_request(outcome: &str) {
    counter!(
        "cost_engine_analysis_requests_total",
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

/// Record an option dropped for a missing key (`compute`/`egress`) or a failed lookup
pub fn record_omission(kind: &str) {
    counter!(
        "cost_engine_options_omitted_total",
        "kind" => kind.to_string(),
    )
    .increment(1);
}

pub fn record_spot_fallback() {
    counter!("cost_engine_spot_fallback_total").increment(1);
}

pub fn record_duration(duration: Duration) {
    histogram!("cost_engine_analysis_duration_seconds").record(duration.as_secs_f64());
}
