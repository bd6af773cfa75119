//! Tracks inter-event interval and produces a velocity multiplier that
//! ramps up under rapid input and decays back to 1.0 under idle. Shared
//! across both axes as a single momentum channel; touched only from the
//! hook thread, so it needs no internal locking.

use crate::types::ScrollParameters;

/// The gain applied to `boost` when events arrive faster than
/// `acceleration_delta` apart. Part of the behavioural contract, not a
/// free tuning knob — see spec §4.4.
const ACCEL_GAIN: f64 = 0.8;

/// The window, in milliseconds, over which velocity decays back toward
/// 1.0 once events slow down. Part of the behavioural contract.
const DECAY_WINDOW_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy)]
pub struct AcceleratorState {
    /// `None` until the first event is stepped, so that event can't be
    /// mistaken for a rapid follow-up to some phantom event at time zero.
    last_event_time: Option<u64>,
    velocity: f64,
}

impl Default for AcceleratorState {
    fn default() -> Self {
        AcceleratorState {
            last_event_time: None,
            velocity: 1.0,
        }
    }
}

impl AcceleratorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current velocity multiplier, always in `[1.0, acceleration_max]`
    /// for whatever `acceleration_max` was last passed to [`Self::step`].
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Resets velocity to the base `1.0` without disturbing
    /// `last_event_time`. Called when an axis enqueue turns out to be a
    /// direction reversal (spec §3: "the state resets ... velocity ←
    /// 1.0"): the reversing event's own amount is computed from the
    /// velocity as it stood *before* this call, so the reset only ever
    /// affects events that follow the reversal.
    pub fn reset_velocity(&mut self) {
        self.velocity = 1.0;
    }

    /// Advances the accelerator by one accepted wheel event and returns
    /// the scroll amount (`step_size * direction * velocity`) to enqueue.
    ///
    /// `now_ms` is a monotonic millisecond timestamp supplied by the
    /// caller, so this type stays independent of any particular clock
    /// source (real or faked in tests).
    pub fn step(&mut self, raw_delta: i32, params: &ScrollParameters, now_ms: u64) -> f64 {
        let direction = if raw_delta < 0 { -1.0 } else { 1.0 };
        let base_amount = params.step_size as f64 * direction;

        match self.last_event_time {
            None => {
                // The very first event has no predecessor to be rapid
                // relative to; start at the base velocity.
                self.velocity = 1.0;
            }
            Some(last) => {
                let delta_t = now_ms.saturating_sub(last) as f64;
                if delta_t < params.acceleration_delta as f64 {
                    let boost = 1.0 - (delta_t / params.acceleration_delta.max(1) as f64);
                    self.velocity = (self.velocity + ACCEL_GAIN * boost).min(params.acceleration_max);
                } else {
                    let decay = (delta_t / DECAY_WINDOW_MS).min(1.0);
                    self.velocity = (self.velocity * (1.0 - decay)).max(1.0);
                }
            }
        }

        self.last_event_time = Some(now_ms);
        base_amount * self.velocity
    }
}
