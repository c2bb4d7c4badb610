use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use roi_common::metrics::{
    component_info_metric,
    names::{CHANNELS_PROCESSED, FAILURES, REGIONS_EMITTED, TICKS_RETAINED},
};
use std::net::SocketAddr;
use tracing::info;

/// Starts the Prometheus endpoint and describes the component's metrics.
pub(crate) fn install(observability_address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(observability_address)
        .install()?;
    info!("Serving metrics on {observability_address}");

    component_info_metric("waveform-roi-finder");
    register();
    Ok(())
}

fn register() {
    metrics::describe_counter!(
        CHANNELS_PROCESSED,
        metrics::Unit::Count,
        "Number of channels converted to sparse waveforms"
    );
    metrics::describe_counter!(
        REGIONS_EMITTED,
        metrics::Unit::Count,
        "Number of regions of interest emitted"
    );
    metrics::describe_counter!(
        TICKS_RETAINED,
        metrics::Unit::Count,
        "Number of ticks retained in regions of interest"
    );
    metrics::describe_counter!(
        FAILURES,
        metrics::Unit::Count,
        "Number of failures encountered"
    );
}
