//! System property store abstraction.
//!
//! The legacy HAL reads the managed interface name from a system property.
//! Hosts without an Android property service use [`EnvPropertyStore`],
//! configuration files provide a [`PropertyMap`], and [`LayeredProperties`]
//! stacks them.

use crate::legacy::consts::{DEFAULT_WLAN_INTERFACE, WIFI_INTERFACE_PROPERTY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view of a system property store.
pub trait PropertyStore: Send + Sync {
    /// Value of `key`, or `None` when unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// Read `key`, falling back to `default` when unset or empty.
pub fn property_get(store: &dyn PropertyStore, key: &str, default: &str) -> String {
    match store.get(key) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Name of the WLAN interface the legacy HAL should bind to.
pub fn wlan_interface_name(store: &dyn PropertyStore) -> String {
    property_get(store, WIFI_INTERFACE_PROPERTY, DEFAULT_WLAN_INTERFACE)
}

/// In-memory property store, deserialized from a TOML `[properties]` table.
///
/// ```toml
/// [properties]
/// "wifi.interface" = "wlan1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(HashMap<String, String>);

impl PropertyMap {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of properties held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no property is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PropertyStore for PropertyMap {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Environment-backed store: `wifi.interface` reads `WIFI_INTERFACE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvPropertyStore;

impl EnvPropertyStore {
    /// Environment variable consulted for `key`.
    pub fn env_var_name(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

impl PropertyStore for EnvPropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_var_name(key)).ok()
    }
}

/// First layer holding a non-empty value wins.
#[derive(Clone, Default)]
pub struct LayeredProperties {
    layers: Vec<Arc<dyn PropertyStore>>,
}

impl LayeredProperties {
    /// Empty stack; every lookup is unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority layer.
    pub fn layer(mut self, store: Arc<dyn PropertyStore>) -> Self {
        self.layers.push(store);
        self
    }
}

impl PropertyStore for LayeredProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.layers
            .iter()
            .filter_map(|store| store.get(key))
            .find(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_property_reads_default() {
        let store = PropertyMap::new();
        assert_eq!(wlan_interface_name(&store), DEFAULT_WLAN_INTERFACE);
    }

    #[test]
    fn empty_property_reads_default() {
        let store = PropertyMap::new().with(WIFI_INTERFACE_PROPERTY, "");
        assert_eq!(wlan_interface_name(&store), "wlan0");
    }

    #[test]
    fn configured_property_wins() {
        let store = PropertyMap::new().with(WIFI_INTERFACE_PROPERTY, "wlan1");
        assert_eq!(wlan_interface_name(&store), "wlan1");
    }

    #[test]
    fn env_var_name_mapping() {
        assert_eq!(EnvPropertyStore::env_var_name("wifi.interface"), "WIFI_INTERFACE");
        assert_eq!(EnvPropertyStore::env_var_name("ro.hw-type"), "RO_HW_TYPE");
    }

    #[test]
    fn layered_lookup_skips_empty_layers() {
        let top = PropertyMap::new().with(WIFI_INTERFACE_PROPERTY, "");
        let bottom = PropertyMap::new().with(WIFI_INTERFACE_PROPERTY, "wlan2");
        let layered = LayeredProperties::new()
            .layer(Arc::new(top))
            .layer(Arc::new(bottom));
        assert_eq!(wlan_interface_name(&layered), "wlan2");
        assert_eq!(LayeredProperties::new().get(WIFI_INTERFACE_PROPERTY), None);
    }
}
