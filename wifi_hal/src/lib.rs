//! # WiFi Legacy HAL Library
//!
//! Lifecycle shim around a vendor-supplied legacy WiFi driver control
//! library. Vendor libraries implement the `LegacyVendorHal` trait defined
//! in `wifi_common::legacy::vendor`.
//!
//! # Module Structure
//!
//! - [`core`] - `WifiLegacyHal` start/stop state machine, event-loop thread
//! - [`bridge`] - Process-wide stop-completion table and trampoline
//! - [`vendor_registry`] - Vendor factory registration
//! - [`drivers`] - Built-in vendor libraries
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      wifi_hal (single crate)                   │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐  │
//! │  │  Completion  │◄───│ WifiLegacyHal│◄──►│  Vendor Registry │  │
//! │  │    bridge    │    │ (lifecycle)  │    │                  │  │
//! │  └──────▲───────┘    └──────┬───────┘    └──────────────────┘  │
//! │         │ on_stop_complete  │ start/stop, event-loop thread    │
//! │         │                   ▼                                  │
//! │         │          ┌────────────────┐                          │
//! │         └──────────│ LegacyVendorHal│ (trait object)           │
//! │                    └────────────────┘                          │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod bridge;
pub mod core;
pub mod drivers;
pub mod vendor_registry;

// Re-export key types for convenience
pub use crate::core::{LifecyclePhase, WifiLegacyHal};
pub use crate::vendor_registry::VendorRegistry;
