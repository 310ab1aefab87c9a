//! Legacy HAL lifecycle manager.
//!
//! `WifiLegacyHal` owns one vendor library session: it initializes the
//! vendor library, runs its blocking event loop on a dedicated thread,
//! binds the WLAN interface handle, and tears everything down through the
//! asynchronous vendor `cleanup()`.
//!
//! # Lifecycle
//!
//! ```text
//! Unstarted ──start()──► Starting ──ok──► Running ──stop()──► Stopping ──► Stopped
//!     ▲                     │
//!     └──── error ──────────┘
//! ```
//!
//! `Stopped` is terminal. Starting again needs a new `WifiLegacyHal`.
//!
//! `Stopping → Stopped` needs both the vendor completion (delivered through
//! [`crate::bridge`]) and the event-loop thread observing that its loop
//! returned. The two may arrive in either order and on any thread.
//!
//! All lifecycle state sits behind one mutex. The mutex is never held
//! across a vendor call or the user callback.

use crate::bridge::{self, StopCompletion};
use crate::vendor_registry::VendorRegistry;
use parking_lot::{Condvar, Mutex};
use std::ffi::CStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use wifi_common::legacy::config::LegacyHalConfig;
use wifi_common::legacy::consts::{EVENT_LOOP_THREAD_NAME, IFNAMSIZ};
use wifi_common::legacy::vendor::{InterfaceHandle, LegacyVendorHal, WifiError, WifiHandle};
use wifi_common::properties::{PropertyStore, wlan_interface_name};

/// Observable lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No session; `start()` has not been called.
    Unstarted,
    /// `start()` is initializing the vendor library.
    Starting,
    /// Session open, interface bound, event loop running.
    Running,
    /// `cleanup()` requested; waiting for completion and event-loop exit.
    Stopping,
    /// Session fully torn down.
    Stopped,
}

/// State shared with the event-loop thread and the completion bridge.
#[derive(Debug)]
struct LifecycleState {
    phase: LifecyclePhase,
    global_handle: Option<WifiHandle>,
    wlan_interface_handle: Option<InterfaceHandle>,
    awaiting_event_loop_termination: bool,
    stop_completed: bool,
    /// Teardown issued by `start()` itself after a failed interface lookup.
    aborting_start: bool,
}

impl LifecycleState {
    fn new() -> Self {
        Self {
            phase: LifecyclePhase::Unstarted,
            global_handle: None,
            wlan_interface_handle: None,
            awaiting_event_loop_termination: false,
            stop_completed: false,
            aborting_start: false,
        }
    }
}

struct Shared {
    state: Mutex<LifecycleState>,
    changed: Condvar,
}

impl Shared {
    /// Completion side of a stop: runs on whatever thread the vendor picked.
    fn complete_stop(&self, handle: WifiHandle, user_callback: Option<Box<dyn FnOnce() + Send>>) {
        let recorded = self.state.lock().global_handle;
        if recorded != Some(handle) {
            error!(
                "Stop completion handle {} does not match session {:?}",
                handle, recorded
            );
            panic!("Handle mismatch: expected {recorded:?}, got {handle}");
        }

        if let Some(callback) = user_callback {
            callback();
        }

        let mut state = self.state.lock();
        state.global_handle = None;
        state.wlan_interface_handle = None;
        bridge::release(handle);
        state.stop_completed = true;
        debug!("Legacy HAL stop completion processed");
        self.finish_stop_if_done(&mut state);
    }

    /// Event-loop side: the vendor loop returned.
    fn on_event_loop_exit(&self) {
        let mut state = self.state.lock();
        if !state.awaiting_event_loop_termination {
            drop(state);
            error!("Legacy HAL event loop terminated, but HAL was not stopping");
            panic!("Legacy HAL event loop terminated, but HAL was not stopping");
        }
        debug!("Legacy HAL event loop terminated");
        state.awaiting_event_loop_termination = false;
        self.finish_stop_if_done(&mut state);
    }

    fn finish_stop_if_done(&self, state: &mut LifecycleState) {
        if state.phase != LifecyclePhase::Stopping
            || !state.stop_completed
            || state.awaiting_event_loop_termination
        {
            return;
        }
        state.phase = if state.aborting_start {
            LifecyclePhase::Unstarted
        } else {
            LifecyclePhase::Stopped
        };
        state.stop_completed = false;
        state.aborting_start = false;
        info!("Legacy HAL stopped");
        self.changed.notify_all();
    }
}

/// Body of the dedicated event-loop thread.
///
/// # Panics
/// Panics if the vendor loop returns while no stop is in flight.
fn run_event_loop(vendor: &dyn LegacyVendorHal, shared: &Shared, handle: WifiHandle) {
    debug!("Starting legacy HAL event loop");
    vendor.event_loop(handle);
    shared.on_event_loop_exit();
}

/// Lifecycle manager for one vendor legacy HAL session.
pub struct WifiLegacyHal {
    vendor: Arc<dyn LegacyVendorHal>,
    properties: Arc<dyn PropertyStore>,
    shared: Arc<Shared>,
}

impl WifiLegacyHal {
    /// Create a manager around an already bound vendor function table.
    pub fn new(vendor: Arc<dyn LegacyVendorHal>, properties: Arc<dyn PropertyStore>) -> Self {
        info!("Legacy HAL bound to vendor {} v{}", vendor.name(), vendor.version());
        Self {
            vendor,
            properties,
            shared: Arc::new(Shared {
                state: Mutex::new(LifecycleState::new()),
                changed: Condvar::new(),
            }),
        }
    }

    /// Bind the vendor named in `config` through `registry`.
    ///
    /// # Panics
    /// Panics if the vendor is not registered or cannot supply its
    /// function table; nothing here can work without one.
    pub fn from_registry(
        registry: &VendorRegistry,
        config: &LegacyHalConfig,
        properties: Arc<dyn PropertyStore>,
    ) -> Self {
        let vendor_name = &config.legacy_hal.vendor;
        match registry.bind(vendor_name, config) {
            Ok(vendor) => Self::new(vendor, properties),
            Err(e) => {
                error!("Failed to initialize legacy hal function table ({}): {}", vendor_name, e);
                panic!("Failed to initialize legacy hal function table for '{vendor_name}': {e}");
            }
        }
    }

    /// Start the vendor library and bind the WLAN interface.
    ///
    /// Returns once the interface is bound; the event loop keeps running on
    /// its own thread.
    ///
    /// # Errors
    /// - the vendor status if `initialize` or `get_ifaces` fails
    /// - `WifiError::Unknown` if `initialize` yields a null handle or no
    ///   interface matches the configured name
    ///
    /// When interface lookup fails the session is torn down before this
    /// returns and the manager is back in `Unstarted`.
    ///
    /// # Panics
    /// Panics if called on an instance that is not `Unstarted` (a session
    /// is open, a stop is in flight, or it has already stopped), or if the
    /// event-loop thread cannot be spawned.
    pub fn start(&self) -> Result<(), WifiError> {
        {
            let mut state = self.shared.state.lock();
            if state.phase != LifecyclePhase::Unstarted
                || state.global_handle.is_some()
                || state.wlan_interface_handle.is_some()
                || state.awaiting_event_loop_termination
            {
                let snapshot = format!("{:?}", *state);
                drop(state);
                error!("Legacy HAL start requested in state {}", snapshot);
                panic!("Legacy HAL start requested in state {snapshot}");
            }
            state.phase = LifecyclePhase::Starting;
        }

        info!("Starting legacy HAL");
        let handle = match self.vendor.initialize() {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                error!("Failed to retrieve global handle: vendor returned null");
                self.set_phase(LifecyclePhase::Unstarted);
                return Err(WifiError::Unknown);
            }
            Err(e) => {
                error!("Failed to retrieve global handle: {}", e);
                self.set_phase(LifecyclePhase::Unstarted);
                return Err(e);
            }
        };
        self.shared.state.lock().global_handle = Some(handle);

        self.spawn_event_loop(handle);

        match self.retrieve_wlan_interface_handle(handle) {
            Ok(iface) => {
                let mut state = self.shared.state.lock();
                state.wlan_interface_handle = Some(iface);
                state.phase = LifecyclePhase::Running;
                self.shared.changed.notify_all();
                debug!("Legacy HAL start complete (session {}, iface {})", handle, iface);
                Ok(())
            }
            Err(e) => {
                error!("Failed to retrieve wlan interface handle: {}", e);
                self.abort_start(handle);
                Err(e)
            }
        }
    }

    /// Request asynchronous teardown.
    ///
    /// `Ok(())` only means cleanup was requested. `on_stop_complete` runs
    /// exactly once, later, on a vendor-chosen thread, and may assume the
    /// vendor cleanup has completed. There is no timeout: if the vendor
    /// never reports completion the manager stays in `Stopping`.
    ///
    /// # Errors
    /// - `WifiError::Busy` if a stop is already in flight
    /// - `WifiError::Uninitialized` if no session is running
    pub fn stop<F>(&self, on_stop_complete: F) -> Result<(), WifiError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = {
            let mut state = self.shared.state.lock();
            match state.phase {
                LifecyclePhase::Running => {}
                LifecyclePhase::Stopping => {
                    warn!("Legacy HAL stop requested while a stop is in flight");
                    return Err(WifiError::Busy);
                }
                phase => {
                    warn!("Legacy HAL stop requested in phase {:?}", phase);
                    return Err(WifiError::Uninitialized);
                }
            }
            let Some(handle) = state.global_handle else {
                drop(state);
                error!("Legacy HAL running without a global handle");
                panic!("Legacy HAL running without a global handle");
            };
            state.phase = LifecyclePhase::Stopping;
            state.awaiting_event_loop_termination = true;
            handle
        };

        info!("Stopping legacy HAL");
        self.request_cleanup(handle, Some(Box::new(on_stop_complete)));
        debug!("Legacy HAL stop initiated");
        Ok(())
    }

    /// Block until the manager reaches `Stopped` or `timeout` elapses.
    ///
    /// Caller-side convenience only. Returns true if `Stopped`.
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while state.phase == LifecyclePhase::Stopping {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.phase == LifecyclePhase::Stopped
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.shared.state.lock().phase
    }

    /// Handle of the open vendor session, if any.
    pub fn global_handle(&self) -> Option<WifiHandle> {
        self.shared.state.lock().global_handle
    }

    /// Handle of the bound WLAN interface, if any.
    pub fn interface_handle(&self) -> Option<InterfaceHandle> {
        self.shared.state.lock().wlan_interface_handle
    }

    /// True from `stop()` until the event-loop thread sees its loop return.
    pub fn is_stop_in_flight(&self) -> bool {
        self.shared.state.lock().awaiting_event_loop_termination
    }

    /// The bound vendor function table.
    pub fn vendor(&self) -> &Arc<dyn LegacyVendorHal> {
        &self.vendor
    }

    fn set_phase(&self, phase: LifecyclePhase) {
        self.shared.state.lock().phase = phase;
        self.shared.changed.notify_all();
    }

    fn spawn_event_loop(&self, handle: WifiHandle) {
        let vendor = Arc::clone(&self.vendor);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(EVENT_LOOP_THREAD_NAME.to_string())
            .spawn(move || run_event_loop(vendor.as_ref(), &shared, handle));

        if let Err(e) = spawned {
            error!("Failed to spawn legacy HAL event loop thread: {}", e);
            panic!("Failed to spawn legacy HAL event loop thread: {e}");
        }
    }

    /// Tear down a session whose interface lookup failed, then wait for it.
    fn abort_start(&self, handle: WifiHandle) {
        {
            let mut state = self.shared.state.lock();
            state.phase = LifecyclePhase::Stopping;
            state.awaiting_event_loop_termination = true;
            state.aborting_start = true;
        }

        warn!("Tearing down legacy HAL session {} after failed start", handle);
        self.request_cleanup(handle, None);

        let mut state = self.shared.state.lock();
        while state.phase == LifecyclePhase::Stopping {
            self.shared.changed.wait(&mut state);
        }
    }

    fn request_cleanup(&self, handle: WifiHandle, user_callback: Option<Box<dyn FnOnce() + Send>>) {
        let shared = Arc::clone(&self.shared);
        let completion: StopCompletion =
            Box::new(move |completed| shared.complete_stop(completed, user_callback));
        bridge::install(handle, completion);
        self.vendor.cleanup(handle, bridge::on_stop_complete);
    }

    fn retrieve_wlan_interface_handle(&self, handle: WifiHandle) -> Result<InterfaceHandle, WifiError> {
        let ifname_to_find = wlan_interface_name(self.properties.as_ref());

        let iface_handles = self.vendor.get_ifaces(handle).map_err(|e| {
            error!("Failed to enumerate interface handles: {}", e);
            e
        })?;

        for iface in iface_handles {
            let mut current_ifname = [0u8; IFNAMSIZ];
            if let Err(e) = self.vendor.get_iface_name(iface, &mut current_ifname) {
                warn!("Failed to get interface handle name: {}", e);
                continue;
            }
            match CStr::from_bytes_until_nul(&current_ifname) {
                Ok(name) if name.to_bytes() == ifname_to_find.as_bytes() => return Ok(iface),
                Ok(_) => {}
                Err(_) => warn!("Interface {} name is not NUL-terminated", iface),
            }
        }

        warn!("No interface named {} found", ifname_to_find);
        Err(WifiError::Unknown)
    }
}

impl Drop for WifiLegacyHal {
    fn drop(&mut self) {
        let phase = self.shared.state.lock().phase;
        if matches!(phase, LifecyclePhase::Running | LifecyclePhase::Stopping) {
            warn!("Legacy HAL dropped in phase {:?}; event loop left running", phase);
        }
    }
}
