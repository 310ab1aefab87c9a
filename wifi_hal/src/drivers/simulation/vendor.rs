//! Simulation vendor implementation.
//!
//! Sessions and interfaces get process-unique raw handles so that several
//! simulated vendors can share the completion bridge without colliding.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, info, warn};
use wifi_common::legacy::config::{CompletionMode, SimulationConfig};
use wifi_common::legacy::vendor::{
    InterfaceHandle, LegacyVendorHal, StopCompleteFn, WifiError, WifiHandle, wifi_result,
};

static NEXT_RAW_HANDLE: AtomicUsize = AtomicUsize::new(0x1000);

fn next_raw_handle() -> usize {
    NEXT_RAW_HANDLE.fetch_add(1, Ordering::Relaxed)
}

/// Injected failure status; a configured `0` still reads as a failure.
fn injected(code: i32) -> WifiError {
    wifi_result(code).err().unwrap_or(WifiError::Unknown)
}

#[derive(Debug)]
struct Session {
    interfaces: Vec<InterfaceHandle>,
    cleanup_requested: bool,
    deferred_completion: Option<StopCompleteFn>,
}

#[derive(Debug)]
struct SimInterface {
    name: String,
    readable: bool,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<WifiHandle, Session>,
    interfaces: HashMap<InterfaceHandle, SimInterface>,
}

/// Simulation vendor implementing `LegacyVendorHal`.
pub struct SimulationVendor {
    config: SimulationConfig,
    registry: Mutex<Registry>,
    wake: Condvar,
    running_loops: AtomicUsize,
    cleanup_calls: AtomicUsize,
}

impl SimulationVendor {
    /// Create a simulation vendor with the given behaviour.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(Registry::default()),
            wake: Condvar::new(),
            running_loops: AtomicUsize::new(0),
            cleanup_calls: AtomicUsize::new(0),
        }
    }

    /// Sessions opened by `initialize` whose event loop has not exited.
    pub fn live_sessions(&self) -> usize {
        self.registry.lock().sessions.len()
    }

    /// Threads currently blocked in `event_loop`.
    pub fn running_event_loops(&self) -> usize {
        self.running_loops.load(Ordering::SeqCst)
    }

    /// Total `cleanup` requests received.
    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }

    /// Interface handle currently registered under `name`, if any.
    pub fn interface_named(&self, name: &str) -> Option<InterfaceHandle> {
        self.registry
            .lock()
            .interfaces
            .iter()
            .find(|(_, iface)| iface.name == name)
            .map(|(handle, _)| *handle)
    }
}

impl LegacyVendorHal for SimulationVendor {
    fn name(&self) -> &'static str {
        super::VENDOR_NAME
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&self) -> Result<Option<WifiHandle>, WifiError> {
        if let Some(code) = self.config.fail_initialize {
            warn!("Simulated initialize failure ({})", code);
            return Err(injected(code));
        }

        let handle = WifiHandle::from_raw(next_raw_handle()).ok_or(WifiError::OutOfMemory)?;
        let mut registry = self.registry.lock();
        let mut interfaces = Vec::with_capacity(self.config.interfaces.len());
        for name in &self.config.interfaces {
            let iface = InterfaceHandle::from_raw(next_raw_handle()).ok_or(WifiError::OutOfMemory)?;
            let readable = !self.config.unreadable_interfaces.contains(name);
            registry.interfaces.insert(
                iface,
                SimInterface {
                    name: name.clone(),
                    readable,
                },
            );
            interfaces.push(iface);
        }
        registry.sessions.insert(
            handle,
            Session {
                interfaces,
                cleanup_requested: false,
                deferred_completion: None,
            },
        );

        info!("Simulation vendor session {} opened", handle);
        Ok(Some(handle))
    }

    fn cleanup(&self, handle: WifiHandle, on_complete: StopCompleteFn) {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);

        let mut registry = self.registry.lock();
        let Some(session) = registry.sessions.get_mut(&handle) else {
            warn!("Cleanup requested for unknown session {}", handle);
            return;
        };
        session.cleanup_requested = true;

        let deliver_now = match self.config.completion {
            CompletionMode::EventLoop => {
                session.deferred_completion = Some(on_complete);
                false
            }
            CompletionMode::Caller => true,
            CompletionMode::Detached => {
                let spawned = thread::Builder::new()
                    .name("sim_vendor_cleanup".to_string())
                    .spawn(move || on_complete(handle));
                if let Err(e) = spawned {
                    warn!("Failed to spawn completion thread: {}", e);
                }
                false
            }
            CompletionMode::Never => {
                debug!("Withholding stop completion for {}", handle);
                false
            }
        };
        self.wake.notify_all();
        drop(registry);

        debug!("Simulation vendor cleanup of {} requested", handle);
        if deliver_now {
            on_complete(handle);
        }
    }

    fn get_ifaces(&self, handle: WifiHandle) -> Result<Vec<InterfaceHandle>, WifiError> {
        if let Some(code) = self.config.fail_get_ifaces {
            return Err(injected(code));
        }
        self.registry
            .lock()
            .sessions
            .get(&handle)
            .map(|session| session.interfaces.clone())
            .ok_or(WifiError::Uninitialized)
    }

    fn get_iface_name(&self, iface: InterfaceHandle, buf: &mut [u8]) -> Result<(), WifiError> {
        let registry = self.registry.lock();
        let entry = registry.interfaces.get(&iface).ok_or(WifiError::InvalidArgs)?;
        if !entry.readable {
            return Err(WifiError::NotAvailable);
        }
        let name = entry.name.as_bytes();
        if name.len() >= buf.len() {
            return Err(WifiError::InvalidArgs);
        }
        buf[..name.len()].copy_from_slice(name);
        buf[name.len()] = 0;
        Ok(())
    }

    fn event_loop(&self, handle: WifiHandle) {
        let mut registry = self.registry.lock();
        if !registry.sessions.contains_key(&handle) {
            warn!("Event loop requested for unknown session {}", handle);
            return;
        }

        self.running_loops.fetch_add(1, Ordering::SeqCst);
        debug!("Simulation event loop for {} running", handle);
        while registry
            .sessions
            .get(&handle)
            .is_some_and(|session| !session.cleanup_requested)
        {
            self.wake.wait(&mut registry);
        }

        let completion = registry.sessions.remove(&handle).and_then(|session| {
            for iface in &session.interfaces {
                registry.interfaces.remove(iface);
            }
            session.deferred_completion
        });
        drop(registry);

        if let Some(on_complete) = completion {
            on_complete(handle);
        }
        self.running_loops.fetch_sub(1, Ordering::SeqCst);
        debug!("Simulation event loop for {} exited", handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_common::legacy::consts::IFNAMSIZ;

    fn vendor(interfaces: &[&str]) -> SimulationVendor {
        SimulationVendor::new(SimulationConfig {
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            ..SimulationConfig::default()
        })
    }

    #[test]
    fn initialize_allocates_unique_handles() {
        let sim = vendor(&["wlan0"]);
        let a = sim.initialize().unwrap().unwrap();
        let b = sim.initialize().unwrap().unwrap();
        assert_ne!(a, b);
        assert_eq!(sim.live_sessions(), 2);
    }

    #[test]
    fn iface_names_are_nul_terminated() {
        let sim = vendor(&["eth0", "wlan0"]);
        let handle = sim.initialize().unwrap().unwrap();
        let ifaces = sim.get_ifaces(handle).unwrap();
        assert_eq!(ifaces.len(), 2);

        let mut buf = [0xffu8; IFNAMSIZ];
        sim.get_iface_name(ifaces[1], &mut buf).unwrap();
        assert_eq!(&buf[..6], b"wlan0\0");
    }

    #[test]
    fn short_buffer_rejected() {
        let sim = vendor(&["wlan0"]);
        let handle = sim.initialize().unwrap().unwrap();
        let iface = sim.get_ifaces(handle).unwrap()[0];
        let mut buf = [0u8; 5];
        assert_eq!(sim.get_iface_name(iface, &mut buf), Err(WifiError::InvalidArgs));
    }

    #[test]
    fn injected_failures() {
        let sim = SimulationVendor::new(SimulationConfig {
            fail_initialize: Some(WifiError::Busy.code()),
            ..SimulationConfig::default()
        });
        assert_eq!(sim.initialize(), Err(WifiError::Busy));

        let sim = SimulationVendor::new(SimulationConfig {
            fail_get_ifaces: Some(0),
            ..SimulationConfig::default()
        });
        let handle = sim.initialize().unwrap().unwrap();
        assert_eq!(sim.get_ifaces(handle), Err(WifiError::Unknown));
    }

    #[test]
    fn cleanup_before_event_loop_returns_immediately() {
        fn ignore(_: WifiHandle) {}

        let sim = vendor(&["wlan0"]);
        let handle = sim.initialize().unwrap().unwrap();
        sim.cleanup(handle, ignore);
        sim.event_loop(handle);
        assert_eq!(sim.live_sessions(), 0);
        assert_eq!(sim.running_event_loops(), 0);
        assert_eq!(sim.cleanup_calls(), 1);
    }
}
