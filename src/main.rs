use std::sync::Arc;

use tracing::info;

use zonepark::config::Config;
use zonepark::service::ParkingService;
use zonepark::session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries replies; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Config::from_env()?;
    zonepark::observability::init(config.metrics_port);

    let service = Arc::new(ParkingService::from_config(&config));
    info!("zonepark ready on stdin/stdout");
    info!("  zones: {}", config.zone_names.join(", "));
    info!(
        "  layout: {} areas x {} slots ({} total)",
        config.areas_per_zone,
        config.slots_per_area,
        config.total_slots()
    );
    info!(
        "  tariff: {:.2}/h + {:.2} base",
        config.tariff.hourly_rate, config.tariff.base_fee
    );
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    // Stop on EOF or SIGTERM/ctrl-c, whichever comes first.
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    tokio::pin!(shutdown);

    tokio::select! {
        result = session::process_session(tokio::io::stdin(), tokio::io::stdout(), service.clone()) => {
            result?;
            info!("input closed");
        }
        _ = &mut shutdown => {
            info!("shutdown signal received");
        }
    }

    let stats = service.snapshot().await;
    info!(
        "final: {}/{} slots occupied, {} active, {} completed, {} cancelled, revenue {:.2}",
        stats.occupied_slots,
        stats.total_slots,
        stats.active_requests,
        stats.completed_sessions,
        stats.cancelled_sessions,
        stats.total_revenue
    );
    info!("zonepark stopped");
    Ok(())
}
