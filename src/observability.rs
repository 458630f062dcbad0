use std::net::SocketAddr;

use crate::engine::Engine;
use crate::session::Command;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: engine operations executed. Labels: op, status.
pub const OPERATIONS_TOTAL: &str = "zonepark_operations_total";

/// Histogram: operation latency in seconds, lock wait included. Labels: op.
pub const OPERATION_DURATION_SECONDS: &str = "zonepark_operation_duration_seconds";

/// Counter: session lines rejected before reaching the engine.
pub const SESSION_ERRORS_TOTAL: &str = "zonepark_session_errors_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: free slots per zone. Labels: zone.
pub const SLOTS_AVAILABLE: &str = "zonepark_slots_available";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Publish every zone's free-slot count.
pub fn publish_availability(engine: &Engine) {
    for zone in engine.list_zones() {
        metrics::gauge!(SLOTS_AVAILABLE, "zone" => zone.id.clone()).set(zone.available_slots as f64);
    }
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Allocate { .. } => "allocate",
        Command::Release { .. } => "release",
        Command::Cancel { .. } => "cancel",
        Command::Occupy { .. } => "occupy",
        Command::Rollback { .. } => "rollback",
        Command::Quote { .. } => "quote",
        Command::Snapshot => "snapshot",
        Command::Zones => "zones",
        Command::Active => "active",
        Command::History => "history",
        Command::View => "view",
        Command::Operations => "operations",
    }
}
