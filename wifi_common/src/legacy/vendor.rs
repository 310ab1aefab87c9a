//! Vendor legacy HAL trait, handle types and status codes.
//!
//! This module defines:
//! - `WifiHandle` / `InterfaceHandle` - Opaque tokens handed out by the vendor library
//! - `WifiError` enum - Legacy status codes
//! - `LegacyVendorHal` trait - The vendor function table
//! - `VendorFactory` type alias - Binds a function table

use crate::legacy::config::LegacyHalConfig;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;

/// Opaque token for one live vendor library session.
///
/// Never null: a raw value of zero has no representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WifiHandle(NonZeroUsize);

impl WifiHandle {
    /// Wrap a raw vendor value. Returns `None` for the null handle.
    pub const fn from_raw(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Raw vendor value.
    pub const fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for WifiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.as_raw())
    }
}

/// Opaque token for one network interface exposed by the vendor library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceHandle(NonZeroUsize);

impl InterfaceHandle {
    /// Wrap a raw vendor value. Returns `None` for the null handle.
    pub const fn from_raw(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Raw vendor value.
    pub const fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for InterfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.as_raw())
    }
}

/// Legacy HAL status codes. `WIFI_SUCCESS` (0) is the `Ok` side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(i32)]
pub enum WifiError {
    /// Unknown error
    #[error("UNKNOWN")]
    Unknown = -1,

    /// Vendor library not initialized
    #[error("UNINITIALIZED")]
    Uninitialized = -2,

    /// Operation not supported by the vendor library
    #[error("NOT_SUPPORTED")]
    NotSupported = -3,

    /// Resource not available
    #[error("NOT_AVAILABLE")]
    NotAvailable = -4,

    /// Invalid arguments
    #[error("INVALID_ARGS")]
    InvalidArgs = -5,

    /// Invalid request id
    #[error("INVALID_REQUEST_ID")]
    InvalidRequestId = -6,

    /// Operation timed out
    #[error("TIMED_OUT")]
    TimedOut = -7,

    /// Too many outstanding requests
    #[error("TOO_MANY_REQUESTS")]
    TooManyRequests = -8,

    /// Out of memory
    #[error("OUT_OF_MEMORY")]
    OutOfMemory = -9,

    /// Vendor library busy
    #[error("BUSY")]
    Busy = -10,
}

impl WifiError {
    /// Legacy numeric status code.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Map a raw legacy status into a result.
///
/// `0` is success; any code outside the known range reads as `Unknown`.
pub fn wifi_result(code: i32) -> Result<(), WifiError> {
    let err = match code {
        0 => return Ok(()),
        -2 => WifiError::Uninitialized,
        -3 => WifiError::NotSupported,
        -4 => WifiError::NotAvailable,
        -5 => WifiError::InvalidArgs,
        -6 => WifiError::InvalidRequestId,
        -7 => WifiError::TimedOut,
        -8 => WifiError::TooManyRequests,
        -9 => WifiError::OutOfMemory,
        -10 => WifiError::Busy,
        _ => WifiError::Unknown,
    };
    Err(err)
}

/// Completion callback accepted by [`LegacyVendorHal::cleanup`].
///
/// A plain function pointer: the vendor ABI cannot carry captured state.
pub type StopCompleteFn = fn(WifiHandle);

/// Binds a vendor function table.
///
/// An `Err` means the vendor library cannot supply a valid table.
pub type VendorFactory = fn(&LegacyHalConfig) -> Result<Arc<dyn LegacyVendorHal>, WifiError>;

/// The vendor legacy HAL function table.
///
/// # Contracts
///
/// | Operation | Blocking | Notes |
/// |-----------|----------|-------|
/// | `initialize()` | sync | Returns the session handle |
/// | `cleanup()` | async | Eventually invokes `on_complete(handle)` and makes `event_loop()` return |
/// | `get_ifaces()` | sync | Enumerates interface handles |
/// | `get_iface_name()` | sync | Writes a NUL-terminated name into `buf` |
/// | `event_loop()` | blocks | Returns only once terminated by `cleanup()` |
///
/// `on_complete` may run on any thread: the event-loop thread, a vendor
/// internal thread, or the caller of `cleanup()` before it returns.
pub trait LegacyVendorHal: Send + Sync {
    /// Vendor library identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Vendor library version.
    fn version(&self) -> &'static str;

    /// Open a vendor session. `Ok(None)` is a success status with a null handle.
    fn initialize(&self) -> Result<Option<WifiHandle>, WifiError>;

    /// Request asynchronous teardown of the session.
    fn cleanup(&self, handle: WifiHandle, on_complete: StopCompleteFn);

    /// Enumerate the interfaces of the session.
    fn get_ifaces(&self, handle: WifiHandle) -> Result<Vec<InterfaceHandle>, WifiError>;

    /// Write the NUL-terminated name of `iface` into `buf`.
    fn get_iface_name(&self, iface: InterfaceHandle, buf: &mut [u8]) -> Result<(), WifiError>;

    /// Run the vendor event loop until `cleanup()` terminates it.
    fn event_loop(&self, handle: WifiHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handles_are_unrepresentable() {
        assert!(WifiHandle::from_raw(0).is_none());
        assert!(InterfaceHandle::from_raw(0).is_none());
        assert_eq!(WifiHandle::from_raw(0x2a).map(WifiHandle::as_raw), Some(0x2a));
    }

    #[test]
    fn wifi_result_maps_legacy_codes() {
        assert_eq!(wifi_result(0), Ok(()));
        assert_eq!(wifi_result(-1), Err(WifiError::Unknown));
        assert_eq!(wifi_result(-10), Err(WifiError::Busy));
        assert_eq!(wifi_result(-42), Err(WifiError::Unknown));
        assert_eq!(wifi_result(7), Err(WifiError::Unknown));
    }

    #[test]
    fn wifi_error_code_and_display() {
        assert_eq!(WifiError::NotAvailable.code(), -4);
        assert_eq!(wifi_result(WifiError::TimedOut.code()), Err(WifiError::TimedOut));
        assert_eq!(WifiError::OutOfMemory.to_string(), "OUT_OF_MEMORY");
    }
}
