//! Background Expiry Sweeper
//!
//! Lazy expiry (checking on access) has a gap: a key that expires and is
//! never read again stays in memory forever. The sweeper closes it by
//! periodically running [`KvStore::cleanup_expired`] on a dedicated thread.
//!
//! ## Design
//!
//! The sweeper owns one OS thread and a per-instance stop signal (a
//! `Mutex<bool>` paired with a `Condvar` - no process-wide state). Each
//! cycle it sweeps the store, then waits up to the configured interval on
//! the condvar. `stop()` flips the flag and notifies, so a sleeping sweeper
//! wakes immediately instead of running out the interval; the flag is
//! re-checked both before and after every wait.

use crate::storage::KvStore;
use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info};

/// Default time between sweep cycles.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Per-instance stop signal: a flag guarded by a mutex plus a condvar for
/// interruptible waits.
#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    /// Clears the flag so the sweeper can be started again.
    fn reset(&self) {
        *self.stopped.lock().unwrap() = false;
    }

    /// Sets the flag and wakes any waiter.
    fn request_stop(&self) {
        *self.stopped.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    /// Waits up to `timeout` for a stop request.
    ///
    /// The flag is checked before sleeping and again on every wakeup, so a
    /// stop requested at any point is observed.
    ///
    /// # Returns
    ///
    /// Returns `true` if stop was requested.
    fn wait_for_stop(&self, timeout: Duration) -> bool {
        let guard = self.stopped.lock().unwrap();
        let (guard, _timed_out) = self
            .condvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap();
        *guard
    }
}

/// Periodically sweeps expired entries out of a [`KvStore`].
///
/// # Lifecycle
///
/// `start()` launches the sweep thread and is safe to call again after
/// `stop()`. `stop()` signals the thread, wakes it if sleeping, and joins
/// it before returning; calling it repeatedly - or without a prior
/// `start()` - is a no-op. Dropping the sweeper stops it.
///
/// # Example
///
/// ```no_run
/// use hearthkv::storage::{ExpirySweeper, KvStore};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let store = Arc::new(KvStore::new());
/// let mut sweeper = ExpirySweeper::with_interval(Arc::clone(&store), Duration::from_secs(1));
///
/// sweeper.start().expect("failed to spawn sweeper thread");
/// // ... serve traffic ...
/// sweeper.stop();
/// ```
#[derive(Debug)]
pub struct ExpirySweeper {
    store: Arc<KvStore>,
    interval: Duration,
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    /// Creates a sweeper with the default interval.
    pub fn new(store: Arc<KvStore>) -> Self {
        Self::with_interval(store, DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates a sweeper with a custom interval between cycles.
    pub fn with_interval(store: Arc<KvStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            signal: Arc::new(StopSignal::default()),
            handle: None,
        }
    }

    /// Launches the sweep loop on a background thread.
    ///
    /// Safe to call again after `stop()`; calling it while the loop is
    /// already running is a no-op. Thread-creation failure is fatal to this
    /// startup and surfaced as the `io::Error` from the spawn.
    pub fn start(&mut self) -> io::Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        self.signal.reset();

        let store = Arc::clone(&self.store);
        let signal = Arc::clone(&self.signal);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("hearthkv-sweeper".to_string())
            .spawn(move || sweep_loop(store, signal, interval))?;

        self.handle = Some(handle);
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "expiry sweeper started"
        );
        Ok(())
    }

    /// Requests the loop to exit and blocks until it has.
    ///
    /// Safe to call multiple times or when never started.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.signal.request_stop();

        if handle.join().is_err() {
            error!("expiry sweeper thread panicked");
        }

        info!("expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The sweep loop body: cleanup, interruptible wait, repeat.
fn sweep_loop(store: Arc<KvStore>, signal: Arc<StopSignal>, interval: Duration) {
    loop {
        if signal.wait_for_stop(Duration::ZERO) {
            return;
        }

        store.cleanup_expired();

        if signal.wait_for_stop(interval) {
            return;
        }
    }
}
