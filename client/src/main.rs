// Native dashboard host for the GT7 telemetry stream.

use std::process::ExitCode;

use telemetry_core::DashboardClient;
use tracing::{error, info};

use gt7_dashboard_client::config::ClientConfig;
use gt7_dashboard_client::render::terminal_targets;
use gt7_dashboard_client::tasks::{self, LoopTiming};
use gt7_dashboard_client::transport::WsConnector;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let url = match DashboardClient::endpoint(&config.origin) {
        Ok(url) => url,
        Err(err) => {
            error!(origin = %config.origin, %err, "invalid origin");
            return ExitCode::FAILURE;
        }
    };

    let mut client = DashboardClient::new(config.dashboard.clone(), terminal_targets());
    if config.demo {
        client.set_demo(true);
    }

    let timing = LoopTiming {
        tick: config.tick_interval(),
        demo: config.demo_interval(),
    };
    info!(%url, tick_hz = config.tick_hz, demo = config.demo, "starting dashboard");

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    let client = tasks::dashboard_loop(client, WsConnector, url, timing, shutdown).await;

    let readout = client.readout();
    info!(
        packets = client.packet_count(),
        laps = readout.laps.len(),
        best_lap_ms = ?readout.best_lap_ms,
        max_speed_kmh = readout.max_speed_kmh,
        "dashboard stopped"
    );
    ExitCode::SUCCESS
}
