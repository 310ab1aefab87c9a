//! Prelude module for common re-exports.
//!
//! ```rust
//! use wifi_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::legacy::config::{CompletionMode, LegacyHalConfig, SimulationConfig};

// ─── Vendor contract ────────────────────────────────────────────────
pub use crate::legacy::vendor::{
    InterfaceHandle, LegacyVendorHal, StopCompleteFn, VendorFactory, WifiError, WifiHandle,
    wifi_result,
};

// ─── Properties ─────────────────────────────────────────────────────
pub use crate::properties::{
    EnvPropertyStore, LayeredProperties, PropertyMap, PropertyStore, wlan_interface_name,
};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::legacy::consts::{DEFAULT_WLAN_INTERFACE, IFNAMSIZ, WIFI_INTERFACE_PROPERTY};
