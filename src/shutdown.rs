//! Cooperative cancellation for the session loops

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Longest stretch a [`Shutdown::sleep`] goes without checking the flag
const WAKE_SLICE: Duration = Duration::from_millis(10);

/// Cloneable stop flag shared between a loop and whoever may stop it
///
/// Loops check it once per iteration. The producer paces with
/// [`Shutdown::sleep`], which wakes early on a trigger; the consumer notices
/// within one read timeout.
///
/// # Example
/// ```
/// use tilt_telemetry::Shutdown;
///
/// let shutdown = Shutdown::new();
/// let handle = shutdown.clone();
/// assert!(!shutdown.is_triggered());
/// handle.trigger();
/// assert!(shutdown.is_triggered());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every holder to stop
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` or until triggered, whichever comes first
    ///
    /// Returns true if the wait ended because of a trigger.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_triggered() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(WAKE_SLICE));
        }
    }
}
