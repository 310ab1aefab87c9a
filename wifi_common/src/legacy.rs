//! Vendor legacy HAL contract, constants and configuration.
//!
//! The vendor library itself is opaque; this module only describes the
//! function table the lifecycle manager consumes.

pub mod config;
pub mod consts;
pub mod vendor;
