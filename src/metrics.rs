//! Prometheus metrics
//!
//! Installs the process-wide recorder and exposes `/metrics`. Counters and
//! histograms are recorded where the work happens (services, LLM client);
//! installation lives in `main` so tests can build routers freely.

use axum::routing::get;
use axum::Router;
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the recorder and return the exposition route
pub fn router() -> Router {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    describe_metrics();

    Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}

fn describe_metrics() {
    describe_counter!(
        "paperdock_papers_ingested_total",
        Unit::Count,
        "Total papers ingested"
    );
    describe_histogram!(
        "paperdock_ingest_duration_seconds",
        Unit::Seconds,
        "Ingestion pipeline latency in seconds"
    );
    describe_counter!(
        "paperdock_chat_requests_total",
        Unit::Count,
        "Total chat requests answered"
    );
    describe_histogram!(
        "paperdock_chat_duration_seconds",
        Unit::Seconds,
        "Chat flow latency in seconds"
    );
    describe_counter!(
        "paperdock_llm_requests_total",
        Unit::Count,
        "Total LLM API requests"
    );
    describe_counter!(
        "paperdock_llm_errors_total",
        Unit::Count,
        "Total LLM API errors"
    );
    describe_counter!(
        "paperdock_metadata_failures_total",
        Unit::Count,
        "Metadata replies rejected after the attempt budget"
    );
}
