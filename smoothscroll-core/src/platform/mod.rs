//! The OS-specific seam (spec §4.1a, added in SPEC_FULL): everything that
//! actually talks to Win32 lives behind [`Platform`], so [`crate::hook`],
//! [`crate::axis`] and [`crate::accelerator`] stay pure and
//! platform-independent. Mirrors the teacher crate's own per-OS backend
//! split (`windows` / `macos` / `gtk` modules gated on
//! `cfg(target_os = ...)`), with a `stub` backend standing in for the
//! non-Windows targets this spec has no real backend for.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::axis::Emitter;
use crate::error::EngineError;
use crate::hook::Dispatcher;
use crate::process::ProcessLookup;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(not(target_os = "windows"))]
mod stub;

/// A handle the engine façade uses to ask the hook worker to exit its
/// message loop (spec §4.6: "Transition to Stopping posts a quit message
/// to the hook worker").
pub trait StopHandle: Send + Sync {
    fn request_stop(&self);
}

/// Everything the engine façade needs from the host OS: a way to look up
/// the foreground process, a way to inject synthetic wheel events, and a
/// way to run the hook worker's message loop.
pub trait Platform: Send + Sync {
    fn process_lookup(&self) -> Box<dyn ProcessLookup>;

    fn emitter(&self) -> Arc<dyn Emitter>;

    /// Installs the hook and pumps messages until told to stop or until
    /// installation fails. Blocks for the worker's entire lifetime; the
    /// caller is expected to run this on a dedicated thread. `ready` is
    /// signalled exactly once, with either the installation error or a
    /// [`StopHandle`] the caller can use to unblock this call.
    fn run_hook_worker(&self, dispatcher: Dispatcher, ready: Sender<Result<Box<dyn StopHandle>, EngineError>>);
}

/// Returns the [`Platform`] implementation for the host this was built
/// for.
pub fn current() -> Box<dyn Platform> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsPlatform)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Box::new(stub::StubPlatform)
    }
}
