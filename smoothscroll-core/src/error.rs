//! The engine's one caller-visible error type. See spec §7: every other
//! failure mode inside the core is silent by design and never reaches
//! here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// `SetWindowsHookExW` failed; carries the `GetLastError` code.
    #[error("failed to install the low-level mouse hook (Win32 error 0x{0:08x})")]
    HookInstallFailed(u32),

    /// There is no real hook backend for the current target OS.
    #[error("the interception engine has no backend for this platform")]
    Unsupported,

    /// `start()` was called while the engine was already running or
    /// mid-transition.
    #[error("the engine is already running or transitioning state")]
    AlreadyRunning,
}
