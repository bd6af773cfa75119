//! Monotonic millisecond time source, abstracted so the animation and
//! accelerator math can be driven by a fake clock in tests instead of
//! sleeping in wall-clock time.

use once_cell::sync::Lazy;
use std::time::Instant;

static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

/// A source of monotonic milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// The real clock, backed by [`std::time::Instant`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        PROCESS_START.elapsed().as_millis() as u64
    }
}
