//! Vendor library registry.
//!
//! Maps vendor names to the factories that bind their function tables.
//! Constructor-injected; there is no global registry.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use wifi_common::legacy::config::LegacyHalConfig;
use wifi_common::legacy::vendor::{LegacyVendorHal, VendorFactory, WifiError};

use crate::drivers::register_builtin_vendors;

/// Registry of available vendor legacy HAL libraries.
pub struct VendorRegistry {
    factories: HashMap<&'static str, VendorFactory>,
}

impl VendorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in vendors.
    pub fn with_builtin_vendors() -> Self {
        let mut registry = Self::new();
        register_builtin_vendors(&mut registry);
        registry
    }

    /// Register a vendor factory.
    ///
    /// # Panics
    /// Panics if a vendor with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: VendorFactory) {
        if self.factories.contains_key(name) {
            panic!("Vendor '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a vendor factory by name.
    pub fn get_factory(&self, name: &str) -> Option<VendorFactory> {
        self.factories.get(name).copied()
    }

    /// Bind the function table of the vendor called `name`.
    ///
    /// # Errors
    /// `WifiError::NotAvailable` if no such vendor is registered, otherwise
    /// whatever the vendor factory reports.
    pub fn bind(
        &self,
        name: &str,
        config: &LegacyHalConfig,
    ) -> Result<Arc<dyn LegacyVendorHal>, WifiError> {
        let factory = self.get_factory(name).ok_or(WifiError::NotAvailable)?;
        let vendor = factory(config)?;
        debug!("Bound vendor {} v{}", vendor.name(), vendor.version());
        Ok(vendor)
    }

    /// List all registered vendor names.
    pub fn list_vendors(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for VendorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_common::legacy::vendor::{InterfaceHandle, StopCompleteFn, WifiHandle};

    struct NullVendor;

    impl LegacyVendorHal for NullVendor {
        fn name(&self) -> &'static str {
            "null"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn initialize(&self) -> Result<Option<WifiHandle>, WifiError> {
            Ok(None)
        }

        fn cleanup(&self, _handle: WifiHandle, _on_complete: StopCompleteFn) {}

        fn get_ifaces(&self, _handle: WifiHandle) -> Result<Vec<InterfaceHandle>, WifiError> {
            Ok(Vec::new())
        }

        fn get_iface_name(&self, _iface: InterfaceHandle, _buf: &mut [u8]) -> Result<(), WifiError> {
            Ok(())
        }

        fn event_loop(&self, _handle: WifiHandle) {}
    }

    fn bind_null(_config: &LegacyHalConfig) -> Result<Arc<dyn LegacyVendorHal>, WifiError> {
        Ok(Arc::new(NullVendor))
    }

    fn bind_broken(_config: &LegacyHalConfig) -> Result<Arc<dyn LegacyVendorHal>, WifiError> {
        Err(WifiError::NotSupported)
    }

    #[test]
    fn registry_register_and_bind() {
        let mut reg = VendorRegistry::new();
        reg.register("null", bind_null);

        let vendor = reg.bind("null", &LegacyHalConfig::default()).expect("should bind");
        assert_eq!(vendor.name(), "null");
    }

    #[test]
    fn registry_vendor_not_found() {
        let reg = VendorRegistry::new();
        let result = reg.bind("bcmdhd", &LegacyHalConfig::default());
        assert!(matches!(result, Err(WifiError::NotAvailable)));
    }

    #[test]
    fn registry_factory_failure_propagates() {
        let mut reg = VendorRegistry::new();
        reg.register("broken", bind_broken);
        let result = reg.bind("broken", &LegacyHalConfig::default());
        assert!(matches!(result, Err(WifiError::NotSupported)));
    }

    #[test]
    fn registry_builtin_vendors() {
        let reg = VendorRegistry::with_builtin_vendors();
        assert_eq!(reg.list_vendors(), vec!["simulation"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut reg = VendorRegistry::new();
        reg.register("dup", bind_null);
        reg.register("dup", bind_null);
    }
}
