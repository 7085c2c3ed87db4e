//! Battery HAL daemon
//!
//! Serves `vendor.benzeneos.battery.IBattery` on a Unix socket until SIGTERM
//! or SIGINT.

use anyhow::{Context, Result};
use benzene_battery_service::{BatteryService, Server, ServiceConfig, Sysfs};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
    let config_path = ServiceConfig::locate();
    let config = match &config_path {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    setup_logging(&config.log_level);
    info!("Starting {}", config.instance);
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => warn!("No configuration file found, using defaults"),
    }

    setup_signal_handlers().context("Failed to install signal handlers")?;

    let service = BatteryService::new(Sysfs::new(&config.sysfs_root), config.charge_limit);
    let server = Server::bind(&config.socket_path, service, config.workers)
        .with_context(|| format!("Failed to bind {}", config.socket_path.display()))?;

    server.serve(&SHUTDOWN).context("Server failed")?;

    info!("Shutting down");
    Ok(())
}

/// Setup tracing, preferring `RUST_LOG` over the configured level
fn setup_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(false))
        .init();
}

fn setup_signal_handlers() -> Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );

    // SAFETY: the handler only stores to an atomic
    unsafe {
        sigaction(Signal::SIGTERM, &action)?;
        sigaction(Signal::SIGINT, &action)?;
    }

    Ok(())
}

extern "C" fn handle_signal(_sig: i32) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}
