//! Simulation vendor library.
//!
//! A software stand-in for a vendor legacy HAL, used by the daemon when no
//! hardware vendor is configured and by the tests.

mod vendor;

pub use vendor::SimulationVendor;

use std::sync::Arc;
use wifi_common::legacy::config::LegacyHalConfig;
use wifi_common::legacy::vendor::{LegacyVendorHal, WifiError};

/// Registered vendor name.
pub const VENDOR_NAME: &str = "simulation";

/// Factory binding a simulation vendor from the `[simulation]` section.
pub fn create_vendor(config: &LegacyHalConfig) -> Result<Arc<dyn LegacyVendorHal>, WifiError> {
    Ok(Arc::new(SimulationVendor::new(config.simulation.clone())))
}
