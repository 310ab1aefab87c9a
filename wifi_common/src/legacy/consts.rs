//! Legacy HAL constants.

use static_assertions::const_assert;

/// Canonical service name (used for logging and the default config).
pub const LEGACY_HAL_SERVICE_NAME: &str = "wifi_legacy_hal";

/// System property naming the WLAN interface to manage.
pub const WIFI_INTERFACE_PROPERTY: &str = "wifi.interface";

/// Interface name used when the property is unset.
pub const DEFAULT_WLAN_INTERFACE: &str = "wlan0";

/// Size of the buffer handed to `get_iface_name`, terminator included.
pub const IFNAMSIZ: usize = libc::IFNAMSIZ;

/// Name of the dedicated event-loop thread.
pub const EVENT_LOOP_THREAD_NAME: &str = "wifi_legacy_hal_evt";

/// Vendor library bound when nothing else is configured.
pub const DEFAULT_VENDOR: &str = "simulation";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wifi/legacy_hal.toml";

const_assert!(DEFAULT_WLAN_INTERFACE.len() < IFNAMSIZ);
