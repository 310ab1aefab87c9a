//! Stop-completion bridge.
//!
//! Vendor `cleanup()` only accepts a plain function pointer, so the
//! per-session completion closures live in a process-wide table keyed by
//! session handle. [`on_stop_complete`] is the trampoline handed to the
//! vendor; it looks up the closure registered for the handle it receives
//! and runs it.
//!
//! A table rather than a single slot: several sessions may have a stop in
//! flight at the same time.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::LazyLock;
use tracing::error;
use wifi_common::legacy::vendor::WifiHandle;

/// Closure run once the vendor reports stop completion for a session.
pub type StopCompletion = Box<dyn FnOnce(WifiHandle) + Send + 'static>;

/// `None` while the completion is executing; the entry is removed afterwards.
static PENDING: LazyLock<Mutex<HashMap<WifiHandle, Option<StopCompletion>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Register the completion for `handle`.
///
/// # Panics
/// Panics if a completion is already registered for `handle`.
pub fn install(handle: WifiHandle, completion: StopCompletion) {
    let mut pending = PENDING.lock();
    match pending.entry(handle) {
        Entry::Occupied(_) => {
            drop(pending);
            error!("Stop completion already registered for handle {}", handle);
            panic!("Stop completion already registered for handle {handle}");
        }
        Entry::Vacant(slot) => {
            slot.insert(Some(completion));
        }
    }
}

/// Completion trampoline passed to the vendor `cleanup()`.
///
/// Runs with the table lock released, so the completion may itself
/// install or query entries.
///
/// # Panics
/// Panics if no stop is in flight for `handle` ("Handle mismatch"), or if
/// the vendor delivers the same completion twice.
pub fn on_stop_complete(handle: WifiHandle) {
    let completion = {
        let mut pending = PENDING.lock();
        match pending.get_mut(&handle) {
            Some(slot) => slot.take(),
            None => {
                drop(pending);
                error!("Stop completion for unknown handle {}", handle);
                panic!("Handle mismatch: no stop in flight for {handle}");
            }
        }
    };

    let Some(completion) = completion else {
        error!("Stop completion delivered twice for handle {}", handle);
        panic!("Stop completion delivered twice for {handle}");
    };

    completion(handle);
    release(handle);
}

/// Drop the entry for `handle` once its completion has been taken.
///
/// Completions call this themselves to clear the slot before they publish
/// the stopped state; an entry holding a not-yet-run completion is kept.
pub fn release(handle: WifiHandle) {
    let mut pending = PENDING.lock();
    if matches!(pending.get(&handle), Some(None)) {
        pending.remove(&handle);
    }
}

/// True while a stop is in flight for `handle`.
pub fn is_pending(handle: WifiHandle) -> bool {
    PENDING.lock().contains_key(&handle)
}

/// Number of stops in flight across the process.
pub fn pending_count() -> usize {
    PENDING.lock().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Raw values well away from the ones other tests allocate.
    fn handle(raw: usize) -> WifiHandle {
        WifiHandle::from_raw(0xb000_0000 + raw).unwrap()
    }

    #[test]
    fn completion_runs_once_and_clears_entry() {
        let h = handle(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        install(
            h,
            Box::new(move |completed| {
                assert_eq!(completed, h);
                // Still registered while executing.
                assert!(is_pending(completed));
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(is_pending(h));
        // Other tests share the table, so only a lower bound holds.
        assert!(pending_count() >= 1);
        on_stop_complete(h);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!is_pending(h));
    }

    #[test]
    fn entry_can_be_reinstalled_after_completion() {
        let h = handle(2);
        install(h, Box::new(|_| {}));
        on_stop_complete(h);
        install(h, Box::new(|_| {}));
        assert!(is_pending(h));
        on_stop_complete(h);
        assert!(!is_pending(h));
    }

    #[test]
    fn sessions_are_independent() {
        let (a, b) = (handle(3), handle(4));
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for h in [a, b] {
            let order = Arc::clone(&order);
            install(h, Box::new(move |completed| order.lock().push(completed)));
        }

        on_stop_complete(b);
        assert!(is_pending(a));
        on_stop_complete(a);
        assert_eq!(*order.lock(), vec![b, a]);
    }

    #[test]
    fn release_keeps_unrun_completion() {
        let h = handle(7);
        install(h, Box::new(|_| {}));
        release(h);
        assert!(is_pending(h));
        on_stop_complete(h);
        assert!(!is_pending(h));
    }

    #[test]
    fn completion_may_release_itself() {
        let h = handle(8);
        install(
            h,
            Box::new(|completed| {
                release(completed);
                assert!(!is_pending(completed));
            }),
        );
        on_stop_complete(h);
        assert!(!is_pending(h));
    }

    #[test]
    #[should_panic(expected = "Handle mismatch")]
    fn unknown_handle_is_fatal() {
        on_stop_complete(handle(5));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn double_install_is_fatal() {
        let h = handle(6);
        install(h, Box::new(|_| {}));
        install(h, Box::new(|_| {}));
    }
}
