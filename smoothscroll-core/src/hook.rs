//! Per-event decision logic for the hook dispatcher (spec §4.6). The
//! classification and routing rules here are pure functions of decoded
//! event fields and the current [`GlobalSettings`], so they are testable
//! without installing a real OS hook; [`crate::platform`] supplies the
//! Win32-specific glue that decodes a raw hook message into a
//! [`WheelEvent`] and calls [`Dispatcher::handle_event`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::accelerator::AcceleratorState;
use crate::axis::{Axis, AxisAnimator, AxisParams, Emitter};
use crate::process::{ProcessLookup, ProcessNameCache};
use crate::types::GlobalSettings;

/// The value this build stamps onto every synthetic wheel event it
/// injects, and checks for on every observed event, to recognize and
/// unconditionally pass through its own injections (spec §4.6 step 3,
/// §9 "self-injection marker"). Arbitrary but fixed: the ASCII bytes
/// `"OSSW"` (OpenSmoothScroll Wheel) packed into a `u32`.
pub const SELF_INJECTION_MARKER: usize = 0x4F_53_53_57;

/// A decoded wheel event, independent of how the host OS delivered it.
#[derive(Debug, Clone, Copy)]
pub struct WheelEvent {
    /// Signed wheel delta, `+120`/`-120` per detent on a standard wheel.
    pub raw_delta: i16,
    /// `true` for a vertical-wheel message, `false` for horizontal.
    pub is_vertical: bool,
    /// Ctrl's high-order async key-state bit, sampled at decode time.
    pub ctrl_held: bool,
    /// Shift's high-order async key-state bit, sampled at decode time.
    pub shift_held: bool,
    /// The event's extra-info field, compared against
    /// [`SELF_INJECTION_MARKER`].
    pub extra_info: usize,
}

/// First-match-wins outcome of classifying a raw event (spec §4.6 steps
/// 1-5): either pass it through untouched, or proceed to full processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Pass,
    Proceed,
}

fn classify(
    enabled: bool,
    event: &WheelEvent,
    is_self_injected: bool,
    is_blacklisted: bool,
) -> Classification {
    if !enabled {
        return Classification::Pass;
    }
    if is_self_injected {
        return Classification::Pass;
    }
    if is_blacklisted {
        return Classification::Pass;
    }
    if event.ctrl_held {
        return Classification::Pass;
    }
    Classification::Proceed
}

/// Resolves which axis an event targets, honoring the Shift-swap rule
/// (spec §4.6 step 7): a vertical message re-labels as horizontal when
/// `shift_horizontal` is enabled and Shift is held.
fn resolve_axis(event: &WheelEvent, shift_horizontal: bool) -> Axis {
    if event.is_vertical && shift_horizontal && event.shift_held {
        Axis::Horizontal
    } else if event.is_vertical {
        Axis::Vertical
    } else {
        Axis::Horizontal
    }
}

/// Where a resolved scroll amount goes (spec §4.6 step 10).
enum Route {
    Animate(Axis),
    EmitImmediate(Axis),
}

fn route(axis: Axis, horizontal_smoothness: bool) -> Route {
    match axis {
        Axis::Vertical => Route::Animate(Axis::Vertical),
        Axis::Horizontal if horizontal_smoothness => Route::Animate(Axis::Horizontal),
        Axis::Horizontal => Route::EmitImmediate(Axis::Horizontal),
    }
}

/// What the hook callback should do with the original OS event, per
/// spec §4.6: `Pass` calls `CallNextHookEx`, `Drop` suppresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Drop,
}

/// Ties together the process-name cache, the accelerator, and both axis
/// animators into the per-event pipeline of spec §4.6. Lives entirely on
/// the hook thread: [`ProcessNameCache`] and [`AcceleratorState`] are
/// touched only here, so neither needs synchronization.
pub struct Dispatcher {
    settings: Arc<ArcSwap<GlobalSettings>>,
    lookup: Box<dyn ProcessLookup>,
    cache: ProcessNameCache,
    accelerator: AcceleratorState,
    vertical: Arc<AxisAnimator>,
    horizontal: Arc<AxisAnimator>,
    immediate_emitter: Arc<dyn Emitter>,
    disabled: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(
        settings: Arc<ArcSwap<GlobalSettings>>,
        lookup: Box<dyn ProcessLookup>,
        vertical: Arc<AxisAnimator>,
        horizontal: Arc<AxisAnimator>,
        immediate_emitter: Arc<dyn Emitter>,
        disabled: Arc<AtomicBool>,
    ) -> Self {
        Dispatcher {
            settings,
            lookup,
            cache: ProcessNameCache::new(),
            accelerator: AcceleratorState::new(),
            vertical,
            horizontal,
            immediate_emitter,
            disabled,
        }
    }

    /// Runs the full per-event pipeline (spec §4.6 steps 1-11) and
    /// returns whether the original OS event should pass through or be
    /// dropped. Never panics: any unexpected condition degrades to
    /// `Decision::Pass`, per spec §7 ("the hook must never raise out to
    /// the OS").
    pub fn handle_event(&mut self, event: WheelEvent, now_ms: u64) -> Decision {
        let settings = self.settings.load();

        let is_self_injected = event.extra_info == SELF_INJECTION_MARKER;

        // Resolve the foreground exe only when we might actually need it:
        // an already-Pass classification for disabled/self-injected/ctrl
        // never has to pay for it. Blacklist membership does need it.
        let exe = if !settings.enabled || is_self_injected || event.ctrl_held {
            String::new()
        } else {
            self.cache.foreground_exe(self.lookup.as_ref())
        };
        let is_blacklisted = settings.is_blacklisted(&exe);

        if classify(settings.enabled, &event, is_self_injected, is_blacklisted) == Classification::Pass
        {
            return Decision::Pass;
        }

        let axis = resolve_axis(&event, settings.shift_horizontal);
        let params = settings.resolve(&exe);
        let amount = self.accelerator.step(event.raw_delta as i32, &params, now_ms);

        let axis_params = AxisParams {
            parameters: params,
            easing: settings.animation_easing,
        };

        // A reversal is detected by the axis itself (it alone holds the
        // outstanding target/current remainder); the accelerator's
        // velocity lives here on the Dispatcher, so the reset happens on
        // this side once the axis reports one. This event's own `amount`
        // was already computed above from the pre-reset velocity, so the
        // reset only affects events that follow.
        let is_reversal = match route(axis, settings.horizontal_smoothness) {
            Route::Animate(Axis::Vertical) => self.vertical.enqueue(amount, axis_params),
            Route::Animate(Axis::Horizontal) => self.horizontal.enqueue(amount, axis_params),
            Route::EmitImmediate(axis) => {
                self.immediate_emitter.emit(axis, amount.trunc() as i32);
                false
            }
        };
        if is_reversal {
            self.accelerator.reset_velocity();
        }

        Decision::Drop
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// The accelerator's current velocity multiplier, for status
    /// introspection and tests.
    pub fn accelerator_velocity(&self) -> f64 {
        self.accelerator.velocity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::process::NullProcessLookup;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeClock(std::sync::atomic::AtomicU64);
    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    struct RecordingEmitter {
        emitted: Mutex<Vec<(Axis, i32)>>,
    }
    impl Emitter for RecordingEmitter {
        fn emit(&self, axis: Axis, delta: i32) {
            self.emitted.lock().push((axis, delta));
        }
    }

    fn wheel(raw_delta: i16) -> WheelEvent {
        WheelEvent {
            raw_delta,
            is_vertical: true,
            ctrl_held: false,
            shift_held: false,
            extra_info: 0,
        }
    }

    fn make_dispatcher(
        settings: GlobalSettings,
    ) -> (Dispatcher, Arc<RecordingEmitter>, Arc<AtomicBool>) {
        let settings = Arc::new(ArcSwap::from_pointee(settings));
        let emitter = Arc::new(RecordingEmitter {
            emitted: Mutex::new(Vec::new()),
        });
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::default());
        let disabled = Arc::new(AtomicBool::new(false));
        let vertical = Arc::new(AxisAnimator::new(
            Axis::Vertical,
            emitter.clone() as Arc<dyn Emitter>,
            clock.clone(),
            disabled.clone(),
        ));
        let horizontal = Arc::new(AxisAnimator::new(
            Axis::Horizontal,
            emitter.clone() as Arc<dyn Emitter>,
            clock,
            disabled.clone(),
        ));
        let dispatcher = Dispatcher::new(
            settings,
            Box::new(NullProcessLookup),
            vertical,
            horizontal,
            emitter.clone() as Arc<dyn Emitter>,
            disabled.clone(),
        );
        (dispatcher, emitter, disabled)
    }

    #[test]
    fn disabled_engine_always_passes() {
        let mut settings = GlobalSettings::default();
        settings.enabled = false;
        let (mut dispatcher, _emitter, _disabled) = make_dispatcher(settings);
        assert_eq!(dispatcher.handle_event(wheel(120), 0), Decision::Pass);
    }

    #[test]
    fn self_injected_event_passes_unconditionally() {
        let (mut dispatcher, _emitter, _disabled) = make_dispatcher(GlobalSettings::default());
        let mut event = wheel(120);
        event.extra_info = SELF_INJECTION_MARKER;
        assert_eq!(dispatcher.handle_event(event, 0), Decision::Pass);
    }

    #[test]
    fn ctrl_held_passes_without_touching_accelerator() {
        let (mut dispatcher, _emitter, _disabled) = make_dispatcher(GlobalSettings::default());
        let mut event = wheel(120);
        event.ctrl_held = true;
        assert_eq!(dispatcher.handle_event(event, 0), Decision::Pass);
        assert_eq!(dispatcher.accelerator.velocity(), 1.0);
    }

    #[test]
    fn accepted_vertical_event_drops_and_animates() {
        let (mut dispatcher, emitter, _disabled) = make_dispatcher(GlobalSettings::default());
        assert_eq!(dispatcher.handle_event(wheel(120), 0), Decision::Drop);
        // No immediate emission for the (smoothed) vertical axis; the
        // animator worker thread does the actual emitting.
        assert!(emitter.emitted.lock().is_empty());
    }

    #[test]
    fn horizontal_without_smoothness_emits_immediately() {
        let mut settings = GlobalSettings::default();
        settings.horizontal_smoothness = false;
        let (mut dispatcher, emitter, _disabled) = make_dispatcher(settings);
        let mut event = wheel(120);
        event.is_vertical = false;
        assert_eq!(dispatcher.handle_event(event, 0), Decision::Drop);
        let emitted = emitter.emitted.lock();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, Axis::Horizontal);
        assert_eq!(emitted[0].1, 100);
    }

    #[test]
    fn shift_swaps_vertical_to_horizontal() {
        let (mut dispatcher, _emitter, _disabled) = make_dispatcher(GlobalSettings::default());
        let mut event = wheel(120);
        event.shift_held = true;
        dispatcher.handle_event(event, 0);
        assert!(dispatcher.horizontal.state_snapshot().is_animating());
        assert!(!dispatcher.vertical.state_snapshot().is_animating());
    }

    #[test]
    fn blacklisted_exe_passes_and_leaves_accelerator_untouched() {
        let mut settings = GlobalSettings::default();
        settings.blacklist_add("evil.exe");
        let settings = Arc::new(ArcSwap::from_pointee(settings));
        let emitter = Arc::new(RecordingEmitter {
            emitted: Mutex::new(Vec::new()),
        });
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::default());
        let disabled = Arc::new(AtomicBool::new(false));
        let vertical = Arc::new(AxisAnimator::new(
            Axis::Vertical,
            emitter.clone() as Arc<dyn Emitter>,
            clock.clone(),
            disabled.clone(),
        ));
        let horizontal = Arc::new(AxisAnimator::new(
            Axis::Horizontal,
            emitter.clone() as Arc<dyn Emitter>,
            clock,
            disabled.clone(),
        ));

        struct AlwaysEvil;
        impl ProcessLookup for AlwaysEvil {
            fn foreground_pid(&self) -> Option<u32> {
                Some(1)
            }
            fn image_path(&self, _pid: u32) -> Option<String> {
                Some("evil.exe".to_string())
            }
        }

        let mut dispatcher = Dispatcher::new(
            settings,
            Box::new(AlwaysEvil),
            vertical,
            horizontal,
            emitter.clone() as Arc<dyn Emitter>,
            disabled,
        );

        assert_eq!(dispatcher.handle_event(wheel(120), 0), Decision::Pass);
        assert_eq!(dispatcher.accelerator.velocity(), 1.0);
    }

    #[test]
    fn direction_reversal_resets_accelerator_velocity() {
        let (mut dispatcher, _emitter, _disabled) = make_dispatcher(GlobalSettings::default());

        // A rapid burst in one direction builds velocity above 1.0.
        dispatcher.handle_event(wheel(120), 0);
        dispatcher.handle_event(wheel(120), 10);
        dispatcher.handle_event(wheel(120), 20);
        assert!(dispatcher.accelerator_velocity() > 1.0);

        // Reversing direction on the same (still in-flight) axis clears
        // the outstanding remainder and must reset velocity back to 1.0.
        dispatcher.handle_event(wheel(-120), 30);
        assert_eq!(dispatcher.accelerator_velocity(), 1.0);
    }
}
