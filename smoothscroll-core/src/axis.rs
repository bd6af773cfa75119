//! Per-axis animation state machine and frame loop.
//!
//! Each axis ([`Axis::Vertical`], [`Axis::Horizontal`]) owns one
//! [`AxisState`] behind a [`parking_lot::Mutex`]. The hook thread enqueues
//! new scroll amounts under that lock; a worker thread, spawned on demand
//! and self-terminating, drains the target down to zero at a fixed frame
//! rate. See spec §4.5 for the frame algorithm this implements verbatim.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::easing;
use crate::types::ScrollParameters;

/// Fixed animation frame rate.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 240);

/// Below this magnitude of remaining pixels, an animation is considered
/// complete and terminates rather than chasing a sub-pixel target forever.
const TERMINATION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// The parameters captured at the moment an axis's animation (re)started:
/// both the resolved [`ScrollParameters`] and the global easing toggle,
/// since both are frozen for the run the same way.
#[derive(Debug, Clone, Copy)]
pub struct AxisParams {
    pub parameters: ScrollParameters,
    pub easing: bool,
}

/// Receives the integer wheel deltas an axis animation emits.
pub trait Emitter: Send + Sync {
    fn emit(&self, axis: Axis, delta: i32);
}

#[derive(Debug, Clone, Copy)]
pub struct AxisState {
    target: f64,
    current: f64,
    animating: bool,
    start_time: u64,
    params_snapshot: AxisParams,
    remainder: f64,
}

impl AxisState {
    pub fn new() -> Self {
        AxisState {
            target: 0.0,
            current: 0.0,
            animating: false,
            start_time: 0,
            params_snapshot: AxisParams {
                parameters: ScrollParameters::default(),
                easing: true,
            },
            remainder: 0.0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    fn reset(&mut self) {
        self.target = 0.0;
        self.current = 0.0;
        self.animating = false;
        self.remainder = 0.0;
    }

    /// Enqueues a new logical scroll of signed magnitude `amount`. See spec
    /// §3's `AxisState` lifecycle:
    ///
    /// - A reversal (current outstanding remainder's sign opposes `amount`)
    ///   replaces the target outright rather than summing into it.
    /// - Otherwise the target accumulates, and the animation restarts from
    ///   zero over a fresh duration — the "continuous push" feel.
    ///
    /// Returns whether this enqueue was a reversal: the caller is
    /// responsible for resetting the shared accelerator's velocity back to
    /// `1.0` when it is (spec §3: "the state resets ... velocity ← 1.0"),
    /// since the accelerator lives outside `AxisState`.
    pub fn enqueue(&mut self, amount: f64, params: AxisParams, now_ms: u64) -> bool {
        let remaining = self.target - self.current;
        let is_reversal = remaining != 0.0 && amount != 0.0 && remaining.signum() != amount.signum();

        if is_reversal {
            self.target = amount;
            self.current = 0.0;
            self.remainder = 0.0;
        } else {
            self.target += amount;
            self.current = 0.0;
        }
        self.animating = true;
        self.start_time = now_ms;
        self.params_snapshot = params;
        is_reversal
    }

    /// Runs one frame of the animation loop (spec §4.5 steps 1-10) and
    /// returns the integer deltas to emit this frame (zero, one, or two —
    /// a mid-frame step and a final residue flush can both fire on the
    /// frame that crosses `progress >= 1.0`) plus whether the axis is now
    /// idle.
    fn advance_frame(&mut self, now_ms: u64) -> (Vec<i32>, bool) {
        let remaining = self.target - self.current;
        if remaining.abs() < TERMINATION_THRESHOLD {
            self.reset();
            return (Vec::new(), true);
        }

        let anim_time = if self.params_snapshot.parameters.animation_time <= 0 {
            1.0
        } else {
            self.params_snapshot.parameters.animation_time as f64
        };
        let elapsed_ms = now_ms.saturating_sub(self.start_time) as f64;
        let progress = (elapsed_ms / anim_time).min(1.0);

        let eased = easing::apply(
            progress,
            self.params_snapshot.parameters.tail_head_ratio,
            self.params_snapshot.easing,
        );

        let desired_pos = self.target * eased;
        let delta_float = (desired_pos - self.current) + self.remainder;
        let delta_int = delta_float.trunc();
        self.remainder = delta_float - delta_int;

        let mut emits = Vec::with_capacity(2);
        if delta_int != 0.0 {
            emits.push(delta_int as i32);
            self.current += delta_int;
        }

        if progress >= 1.0 {
            let residue = (self.target - self.current).trunc();
            if residue != 0.0 {
                emits.push(residue as i32);
                self.current += residue;
            }
            self.reset();
            return (emits, true);
        }

        (emits, false)
    }
}

impl Default for AxisState {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one axis: owns the shared [`AxisState`] and spawns the
/// thread-per-animation worker on demand.
pub struct AxisAnimator {
    axis: Axis,
    state: Arc<Mutex<AxisState>>,
    emitter: Arc<dyn Emitter>,
    clock: Arc<dyn Clock>,
    disabled: Arc<AtomicBool>,
}

impl AxisAnimator {
    pub fn new(
        axis: Axis,
        emitter: Arc<dyn Emitter>,
        clock: Arc<dyn Clock>,
        disabled: Arc<AtomicBool>,
    ) -> Self {
        AxisAnimator {
            axis,
            state: Arc::new(Mutex::new(AxisState::new())),
            emitter,
            clock,
            disabled,
        }
    }

    /// A point-in-time snapshot of this axis's animation state, useful
    /// for status introspection (and for tests, which cannot otherwise
    /// observe the worker thread's progress).
    pub fn state_snapshot(&self) -> AxisState {
        *self.state.lock()
    }

    /// Enqueues `amount` pixels onto this axis, spawning the animation
    /// worker if one isn't already running. Returns whether this enqueue
    /// was a direction reversal (see [`AxisState::enqueue`]).
    pub fn enqueue(&self, amount: f64, params: AxisParams) -> bool {
        let now = self.clock.now_ms();
        let mut guard = self.state.lock();
        let was_animating = guard.is_animating();
        let is_reversal = guard.enqueue(amount, params, now);
        drop(guard);

        if !was_animating {
            self.spawn_worker();
        }

        is_reversal
    }

    fn spawn_worker(&self) {
        let axis = self.axis;
        let state = Arc::clone(&self.state);
        let emitter = Arc::clone(&self.emitter);
        let clock = Arc::clone(&self.clock);
        let disabled = Arc::clone(&self.disabled);

        thread::spawn(move || run_animation_loop(axis, state, emitter, clock, disabled));
    }
}

fn run_animation_loop(
    axis: Axis,
    state: Arc<Mutex<AxisState>>,
    emitter: Arc<dyn Emitter>,
    clock: Arc<dyn Clock>,
    disabled: Arc<AtomicBool>,
) {
    loop {
        if disabled.load(Ordering::Relaxed) {
            state.lock().reset();
            return;
        }

        let now = clock.now_ms();
        let (emits, done) = state.lock().advance_frame(now);

        for delta in emits {
            emitter.emit(axis, delta);
        }

        if done {
            return;
        }

        thread::sleep(FRAME_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AxisParams {
        AxisParams {
            parameters: ScrollParameters {
                step_size: 100,
                animation_time: 400,
                acceleration_delta: 50,
                acceleration_max: 3.0,
                tail_head_ratio: 4.0,
            },
            easing: true,
        }
    }

    #[test]
    fn enqueue_accumulates_same_direction() {
        let mut state = AxisState::new();
        assert!(!state.enqueue(100.0, params(), 0));
        assert_eq!(state.target(), 100.0);
        assert_eq!(state.current(), 0.0);

        // Restarts the animation clock and current, but sums the target.
        assert!(!state.enqueue(100.0, params(), 10));
        assert_eq!(state.target(), 200.0);
        assert_eq!(state.current(), 0.0);
    }

    #[test]
    fn reversal_replaces_target_and_zeroes_current() {
        let mut state = AxisState::new();
        state.enqueue(120.0, params(), 0);
        // Simulate partial progress toward the target.
        let (_emits, _done) = state.advance_frame(100);
        assert!(state.current() != 0.0 || state.target() != 0.0);

        assert!(state.enqueue(-90.0, params(), 150));
        assert_eq!(state.target(), -90.0);
        assert_eq!(state.current(), 0.0);
    }

    #[test]
    fn zero_opposite_remaining_is_not_a_reversal() {
        // If current has already caught up to target (remaining == 0),
        // a new amount of either sign is just a fresh accumulation, not a
        // reversal (reversal requires a nonzero outstanding remainder).
        let mut state = AxisState::new();
        assert!(!state.enqueue(-50.0, params(), 1000));
        assert_eq!(state.target(), -50.0);
    }

    #[test]
    fn full_animation_conserves_total_emitted_delta() {
        let mut state = AxisState::new();
        state.enqueue(100.0, params(), 0);

        let mut total = 0i64;
        let mut t = 0u64;
        loop {
            let (emits, done) = state.advance_frame(t);
            total += emits.iter().map(|&d| d as i64).sum::<i64>();
            if done {
                break;
            }
            t += 4; // ~1/240s in integer ms, good enough to terminate
            assert!(t < 10_000, "animation never terminated");
        }

        assert_eq!(total, 100);
    }

    #[test]
    fn animation_time_guarded_against_non_positive() {
        let mut state = AxisState::new();
        let mut p = params();
        p.parameters.animation_time = 0;
        state.enqueue(10.0, p, 0);

        // With animation_time treated as 1ms, progress is already >= 1.0
        // on the very next frame a millisecond later.
        let (_emits, done) = state.advance_frame(1);
        assert!(done);
    }
}
