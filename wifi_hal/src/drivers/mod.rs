//! Built-in vendor legacy HAL libraries.
//!
//! - [`simulation`] - Software vendor library for development and testing
//!
//! Real vendor libraries are bound the same way: implement
//! `LegacyVendorHal` from `wifi_common::legacy::vendor` and register a
//! factory below.

pub mod simulation;

use crate::vendor_registry::VendorRegistry;

/// Register all built-in vendors.
pub fn register_builtin_vendors(registry: &mut VendorRegistry) {
    registry.register(simulation::VENDOR_NAME, simulation::create_vendor);
}
