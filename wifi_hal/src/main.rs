//! # WiFi Legacy HAL Daemon
//!
//! Binds a vendor legacy HAL library, starts it, and keeps it running until
//! SIGINT/SIGTERM, then stops it and waits for the vendor to finish.
//!
//! # Usage
//!
//! ```bash
//! # Simulation vendor, defaults
//! wifi_hal
//!
//! # Config file, explicit interface, verbose logging
//! wifi_hal --config /etc/wifi/legacy_hal.toml --interface wlan1 -v
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wifi_common::config::{ConfigError, ConfigLoader, LogLevel};
use wifi_common::legacy::config::LegacyHalConfig;
use wifi_common::legacy::consts::{DEFAULT_CONFIG_PATH, WIFI_INTERFACE_PROPERTY};
use wifi_common::properties::{EnvPropertyStore, LayeredProperties, PropertyMap, PropertyStore};
use wifi_hal::{VendorRegistry, WifiLegacyHal, bridge};

/// WiFi Legacy HAL - lifecycle shim for vendor WiFi driver libraries
#[derive(Parser, Debug)]
#[command(name = "wifi_hal")]
#[command(version)]
#[command(about = "Lifecycle shim for vendor legacy WiFi HAL libraries")]
#[command(long_about = None)]
struct Args {
    /// Path to legacy_hal.toml. Falls back to /etc/wifi/legacy_hal.toml if
    /// present, built-in defaults otherwise.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vendor library to bind (overrides [legacy_hal] vendor)
    #[arg(long)]
    vendor: Option<String>,

    /// WLAN interface to manage (overrides the wifi.interface property)
    #[arg(short, long)]
    interface: Option<String>,

    /// Seconds to wait for the vendor to finish stopping
    #[arg(long, default_value_t = 5)]
    stop_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("wifi_hal: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args)?;

    setup_tracing(&args, config.shared.log_level);
    info!(
        "{} v{} starting (vendor={})",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.legacy_hal.vendor
    );

    let properties = build_properties(&args, &config);
    let registry = VendorRegistry::with_builtin_vendors();
    let hal = WifiLegacyHal::from_registry(&registry, &config, properties);

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    })?;

    hal.start()?;
    info!(
        "Legacy HAL running (session {:?}, iface {:?})",
        hal.global_handle(),
        hal.interface_handle()
    );

    shutdown_rx.recv()?;

    hal.stop(|| info!("Legacy HAL stop complete"))?;
    if !hal.wait_stopped(Duration::from_secs(args.stop_timeout)) {
        warn!(
            "Vendor did not finish stopping within {}s (phase {:?})",
            args.stop_timeout,
            hal.phase()
        );
        warn!("{} stop completion(s) still pending", bridge::pending_count());
    }

    info!("Legacy HAL daemon shutdown complete");
    Ok(())
}

/// Load the configuration, apply CLI overrides, then validate once.
fn load_config(args: &Args) -> Result<LegacyHalConfig, ConfigError> {
    let mut config = match config_path(args) {
        Some(path) => LegacyHalConfig::load(&path)?,
        None => LegacyHalConfig::default(),
    };
    if let Some(vendor) = &args.vendor {
        config.legacy_hal.vendor = vendor.clone();
    }
    config.validate()?;
    Ok(config)
}

/// `--config` if given, else the default path when that file exists.
fn config_path(args: &Args) -> Option<PathBuf> {
    args.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        default.is_file().then_some(default)
    })
}

/// CLI override, then environment, then the config file.
fn build_properties(args: &Args, config: &LegacyHalConfig) -> Arc<dyn PropertyStore> {
    let mut cli = PropertyMap::new();
    if let Some(interface) = &args.interface {
        cli.set(WIFI_INTERFACE_PROPERTY, interface.clone());
    }

    Arc::new(
        LayeredProperties::new()
            .layer(Arc::new(cli))
            .layer(Arc::new(EnvPropertyStore))
            .layer(Arc::new(config.properties.clone())),
    )
}

/// Setup tracing subscriber from CLI flags and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose { LogLevel::Debug } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_path_wins() {
        let args = Args::parse_from(["wifi_hal", "--config", "/tmp/other.toml"]);
        assert_eq!(config_path(&args), Some(PathBuf::from("/tmp/other.toml")));
    }

    #[test]
    fn cli_vendor_override_is_validated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy_hal.toml");
        fs::write(&path, "[legacy_hal]\nvendor = \"simulation\"\n").unwrap();
        let path = path.to_str().unwrap();

        let args = Args::parse_from(["wifi_hal", "--config", path, "--vendor", "bcmdhd"]);
        assert_eq!(load_config(&args).unwrap().legacy_hal.vendor, "bcmdhd");

        let args = Args::parse_from(["wifi_hal", "--config", path, "--vendor", ""]);
        assert!(matches!(load_config(&args), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let args = Args::parse_from(["wifi_hal", "--config", "/nonexistent/legacy_hal.toml"]);
        assert!(matches!(load_config(&args), Err(ConfigError::FileNotFound)));
    }
}
