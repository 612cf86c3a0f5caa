mod args;
mod surface;

use anyhow::{bail, Result};
use attitude_config::AppConfig;
use attitude_link::state::OrientationState;
use attitude_link::types::ConnectionState;
use attitude_link::SerialLink;
use attitude_render::{ModelStyle, RenderScheduler};
use clap::Parser;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::args::Args;
use crate::surface::LogSurface;

/// Shown in place of a port list when the host has none.
const NO_PORTS_PLACEHOLDER: &str = "No ports found";

/// Port identifiers for display, never empty.
fn port_choices() -> Vec<String> {
    let ports = attitude_link::available_ports().unwrap_or_else(|e| {
        warn!(?e, "Port enumeration failed");
        Vec::new()
    });
    if ports.is_empty() {
        vec![NO_PORTS_PLACEHOLDER.to_string()]
    } else {
        ports
    }
}

/// Log connection changes; stream failures are the ones the user has to act on.
async fn report_connection(mut status: watch::Receiver<ConnectionState>) {
    while status.changed().await.is_ok() {
        let state = status.borrow_and_update().clone();
        match state {
            ConnectionState::Connected => info!("Connected"),
            ConnectionState::Disconnected => info!("Disconnected"),
            ConnectionState::Failed(reason) => {
                error!(%reason, "Connection lost, restart to reconnect")
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "attitude_monitor=info,attitude_link=info,attitude_render=info".into()
            }),
        )
        .init();

    let args = Args::parse();

    if args.list_ports {
        for port in port_choices() {
            println!("{port}");
        }
        return Ok(());
    }

    info!("Attitude monitor starting");

    // Load config.
    let mut config = attitude_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    args.apply(&mut config);

    let port = match config.serial.port.clone() {
        Some(port) => port,
        None => {
            let first = port_choices().swap_remove(0);
            if first == NO_PORTS_PLACEHOLDER {
                bail!("No serial ports found, plug in the sensor or pass --port");
            }
            first
        }
    };

    let orientation = OrientationState::new();
    let mut link = SerialLink::new(orientation.clone());
    let status_task = tokio::spawn(report_connection(link.subscribe()));

    if let Err(e) = link.start(&port, config.serial.baud_rate) {
        error!(%e, "Connection error");
        return Err(e.into());
    }
    config.serial.port = Some(port);

    // Colors only change through the config file for now.
    let (_style_tx, style_rx) = watch::channel(ModelStyle::from(&config.appearance));

    let mut scheduler = RenderScheduler::new(
        orientation,
        link.subscribe(),
        style_rx,
        Duration::from_millis(config.render.tick_interval_ms.max(1)),
    );
    info!(
        period_ms = u64::try_from(scheduler.period().as_millis()).unwrap_or(u64::MAX),
        "Rendering to log, Ctrl-C to quit"
    );

    let mut surface = LogSurface::new();
    scheduler
        .run(&mut surface, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(?e, "Could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    link.stop().await;
    status_task.abort();

    if let Err(e) = attitude_config::save_config(&config) {
        error!(?e, "Failed to save config");
    }

    Ok(())
}
