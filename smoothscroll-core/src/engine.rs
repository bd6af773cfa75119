//! The engine façade: start/stop lifecycle, the hook worker thread, and
//! the status callback. See spec §4.6 (dispatcher lifetime state machine)
//! and §5 (concurrency and cancellation).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwap;
use log::{info, warn};
use parking_lot::Mutex;

use crate::axis::{Axis, AxisAnimator};
use crate::clock::SystemClock;
use crate::error::EngineError;
use crate::hook::Dispatcher;
use crate::platform::{self, Platform, StopHandle};
use crate::types::GlobalSettings;

/// Ceiling spec §5 places on joining the hook worker when stopping.
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninstalled,
    Installing,
    Running,
    Stopping,
}

type StatusCallback = dyn Fn(bool) + Send + Sync;

struct RunningWorker {
    join: JoinHandle<()>,
    stop_handle: Box<dyn StopHandle>,
}

/// Owns the interception-and-animation engine's lifecycle. One `Engine`
/// corresponds to one hook installation; `start`/`stop` may be called
/// repeatedly across its lifetime.
pub struct Engine {
    settings: Arc<ArcSwap<GlobalSettings>>,
    lifecycle_disabled: Arc<AtomicBool>,
    lifecycle: Mutex<Lifecycle>,
    worker: Mutex<Option<RunningWorker>>,
    status_callback: Mutex<Option<Box<StatusCallback>>>,
    platform: Arc<dyn Platform>,
}

impl Engine {
    pub fn new(settings: GlobalSettings) -> Self {
        Engine {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            lifecycle_disabled: Arc::new(AtomicBool::new(true)),
            lifecycle: Mutex::new(Lifecycle::Uninstalled),
            worker: Mutex::new(None),
            status_callback: Mutex::new(None),
            platform: Arc::from(platform::current()),
        }
    }

    /// Registers a callback invoked with the new running state whenever
    /// the engine transitions. Replaces any previously-registered
    /// callback.
    pub fn set_status_callback(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        *self.status_callback.lock() = Some(Box::new(callback));
    }

    fn notify_status(&self, running: bool) {
        if let Some(cb) = self.status_callback.lock().as_ref() {
            cb(running);
        }
    }

    /// Atomically swaps in a new settings snapshot. An in-flight
    /// animation keeps the `params_snapshot` it already captured; the
    /// new settings take effect on the next enqueue (spec §3/§6).
    pub fn set_settings(&self, settings: GlobalSettings) {
        self.settings.store(Arc::new(settings));
    }

    pub fn settings(&self) -> Arc<GlobalSettings> {
        self.settings.load_full()
    }

    pub fn is_running(&self) -> bool {
        *self.lifecycle.lock() == Lifecycle::Running
    }

    /// Installs the hook and starts the hook worker thread. Returns once
    /// installation has succeeded or failed; it does not block for the
    /// worker's entire lifetime (spec §4.6's `Uninstalled -> Installing
    /// -> Running` transition).
    pub fn start(&self) -> Result<(), EngineError> {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle != Lifecycle::Uninstalled {
                return Err(EngineError::AlreadyRunning);
            }
            *lifecycle = Lifecycle::Installing;
        }

        self.lifecycle_disabled.store(false, Ordering::Relaxed);

        let clock = Arc::new(SystemClock);
        let emitter = self.platform.emitter();
        let vertical = Arc::new(AxisAnimator::new(
            Axis::Vertical,
            Arc::clone(&emitter),
            clock.clone(),
            Arc::clone(&self.lifecycle_disabled),
        ));
        let horizontal = Arc::new(AxisAnimator::new(
            Axis::Horizontal,
            Arc::clone(&emitter),
            clock,
            Arc::clone(&self.lifecycle_disabled),
        ));
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.settings),
            self.platform.process_lookup(),
            vertical,
            horizontal,
            emitter,
            Arc::clone(&self.lifecycle_disabled),
        );

        let (ready_tx, ready_rx) = mpsc::channel();
        let platform = Arc::clone(&self.platform);
        let join = thread::spawn(move || platform.run_hook_worker(dispatcher, ready_tx));

        match ready_rx.recv() {
            Ok(Ok(stop_handle)) => {
                *self.worker.lock() = Some(RunningWorker { join, stop_handle });
                *self.lifecycle.lock() = Lifecycle::Running;
                info!("smooth-scroll engine started");
                self.notify_status(true);
                Ok(())
            }
            Ok(Err(err)) => {
                self.lifecycle_disabled.store(true, Ordering::Relaxed);
                *self.lifecycle.lock() = Lifecycle::Uninstalled;
                let _ = join.join();
                warn!("failed to start the engine: {err}");
                self.notify_status(false);
                Err(err)
            }
            Err(_) => {
                // The worker thread died before signalling either outcome.
                self.lifecycle_disabled.store(true, Ordering::Relaxed);
                *self.lifecycle.lock() = Lifecycle::Uninstalled;
                let _ = join.join();
                self.notify_status(false);
                Err(EngineError::HookInstallFailed(0))
            }
        }
    }

    /// Posts a quit message to the hook worker, joins it (with a 5s
    /// ceiling), and marks the engine stopped. Animator workers observe
    /// `lifecycle_disabled` at the top of their next frame and exit; no
    /// animation is forcibly killed mid-frame (spec §5).
    pub fn stop(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle != Lifecycle::Running {
                return;
            }
            *lifecycle = Lifecycle::Stopping;
        }

        self.lifecycle_disabled.store(true, Ordering::Relaxed);

        if let Some(worker) = self.worker.lock().take() {
            worker.stop_handle.request_stop();
            join_with_timeout(worker.join, STOP_JOIN_TIMEOUT);
        }

        *self.lifecycle.lock() = Lifecycle::Uninstalled;
        info!("smooth-scroll engine stopped");
        self.notify_status(false);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Joins `join` on a bridge thread and waits at most `timeout` for it.
/// `JoinHandle` has no native timed join, so this is the standard
/// work-around: if the worker doesn't exit in time we stop waiting, but
/// the bridge thread (and the worker) are left to finish on their own.
fn join_with_timeout(join: JoinHandle<()>, timeout: Duration) {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = join.join();
        let _ = tx.send(());
    });

    if rx.recv_timeout(timeout).is_err() {
        warn!("hook worker did not stop within {timeout:?}; abandoning the join");
    }
}
