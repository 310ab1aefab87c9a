//! WiFi Common Library
//!
//! This crate provides the vendor library contract, shared constants and
//! configuration loading utilities for the WiFi legacy HAL workspace.
//!
//! # Module Structure
//!
//! - [`legacy`] - Vendor legacy HAL contract, handles, status codes and configuration
//! - [`properties`] - System property store abstraction
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use wifi_common::legacy::vendor::{LegacyVendorHal, WifiError, WifiHandle};
//! use wifi_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod legacy;
pub mod prelude;
pub mod properties;
