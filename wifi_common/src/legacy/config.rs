//! Legacy HAL configuration types.
//!
//! - `LegacyHalConfig` - Main configuration loaded from `legacy_hal.toml`
//! - `VendorSection` - Which vendor library to bind
//! - `SimulationConfig` - Behaviour of the built-in simulation vendor
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//!
//! [legacy_hal]
//! vendor = "simulation"
//!
//! [properties]
//! "wifi.interface" = "wlan0"
//!
//! [simulation]
//! interfaces = ["eth0", "wlan0"]
//! completion = "event_loop"
//! ```

use crate::config::{ConfigError, ConfigLoader, SharedConfig};
use crate::legacy::consts::{DEFAULT_VENDOR, IFNAMSIZ};
use crate::properties::PropertyMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_vendor() -> String {
    DEFAULT_VENDOR.to_string()
}

fn default_interfaces() -> Vec<String> {
    vec!["wlan0".to_string(), "p2p0".to_string()]
}

/// Main configuration loaded from `legacy_hal.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyHalConfig {
    /// Common fields.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Vendor library selection.
    #[serde(default)]
    pub legacy_hal: VendorSection,

    /// Static system properties (e.g. `"wifi.interface"`).
    #[serde(default)]
    pub properties: PropertyMap,

    /// Simulation vendor behaviour.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// `[legacy_hal]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorSection {
    /// Registered name of the vendor library to bind.
    #[serde(default = "default_vendor")]
    pub vendor: String,
}

impl Default for VendorSection {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
        }
    }
}

/// Thread on which the simulation vendor delivers the stop completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// On the event-loop thread, just before `event_loop()` returns.
    #[default]
    EventLoop,
    /// Synchronously, inside `cleanup()`.
    Caller,
    /// On a freshly spawned vendor thread.
    Detached,
    /// Never; the stop stays in flight forever.
    Never,
}

/// `[simulation]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Interfaces reported by `get_ifaces`, in enumeration order.
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<String>,

    /// Interfaces whose name lookup fails.
    #[serde(default)]
    pub unreadable_interfaces: Vec<String>,

    /// Completion delivery thread.
    #[serde(default)]
    pub completion: CompletionMode,

    /// Make `initialize` fail with this legacy status code.
    #[serde(default)]
    pub fail_initialize: Option<i32>,

    /// Make `get_ifaces` fail with this legacy status code.
    #[serde(default)]
    pub fail_get_ifaces: Option<i32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interfaces: default_interfaces(),
            unreadable_interfaces: Vec::new(),
            completion: CompletionMode::default(),
            fail_initialize: None,
            fail_get_ifaces: None,
        }
    }
}

impl LegacyHalConfig {
    /// Load and validate a configuration file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {:?}", path);
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `shared` is invalid
    /// - the vendor name is empty
    /// - a simulated interface name is empty or does not fit `IFNAMSIZ`
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.legacy_hal.vendor.is_empty() {
            return Err(ConfigError::ValidationError(
                "legacy_hal.vendor cannot be empty".to_string(),
            ));
        }

        let names = self
            .simulation
            .interfaces
            .iter()
            .chain(&self.simulation.unreadable_interfaces);
        for name in names {
            if name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "simulation interface name cannot be empty".to_string(),
                ));
            }
            if name.len() >= IFNAMSIZ {
                return Err(ConfigError::ValidationError(format!(
                    "simulation interface name '{}' exceeds {} bytes",
                    name,
                    IFNAMSIZ - 1
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = LegacyHalConfig::from_toml("").unwrap();
        assert_eq!(config.legacy_hal.vendor, DEFAULT_VENDOR);
        assert_eq!(config.simulation.completion, CompletionMode::EventLoop);
        assert!(config.properties.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn completion_mode_snake_case() {
        let config = LegacyHalConfig::from_toml("[simulation]\ncompletion = \"detached\"\n").unwrap();
        assert_eq!(config.simulation.completion, CompletionMode::Detached);
    }

    #[test]
    fn unknown_section_rejected() {
        let result = LegacyHalConfig::from_toml("[scanning]\nenabled = true\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn oversized_interface_name_rejected() {
        let mut config = LegacyHalConfig::default();
        config.simulation.interfaces = vec!["a_very_long_ifname0".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn empty_vendor_rejected() {
        let mut config = LegacyHalConfig::default();
        config.legacy_hal.vendor.clear();
        assert!(config.validate().is_err());
    }
}
