//! Settings data model: [`ScrollParameters`], [`GlobalSettings`] and the
//! sparse per-application override they resolve through.

use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fully-resolved, immutable snapshot of the parameters that govern one
/// axis's animation for one wheel event. Passed by value once computed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScrollParameters {
    /// Pixels emitted per detent.
    pub step_size: i32,
    /// Duration of one animation run, in milliseconds.
    pub animation_time: i32,
    /// Inter-event interval, in milliseconds, below which the accelerator
    /// ramps velocity up.
    pub acceleration_delta: i32,
    /// Upper clamp on the accelerator's velocity multiplier. Always >= 1.0.
    pub acceleration_max: f64,
    /// Shape parameter of the easing curve's deceleration tail.
    pub tail_head_ratio: f64,
}

impl Default for ScrollParameters {
    fn default() -> Self {
        ScrollParameters {
            step_size: 100,
            animation_time: 400,
            acceleration_delta: 50,
            acceleration_max: 3.0,
            tail_head_ratio: 4.0,
        }
    }
}

/// A sparse override of [`ScrollParameters`]'s five fields, keyed per
/// application in [`GlobalSettings::per_app_settings`]. Any field left
/// `None` falls back to the global default when resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PerAppOverride {
    pub step_size: Option<i32>,
    pub animation_time: Option<i32>,
    pub acceleration_delta: Option<i32>,
    pub acceleration_max: Option<f64>,
    pub tail_head_ratio: Option<f64>,
}

impl PerAppOverride {
    /// Applies this override on top of `base`, field by field.
    fn apply(&self, base: ScrollParameters) -> ScrollParameters {
        ScrollParameters {
            step_size: self.step_size.unwrap_or(base.step_size),
            animation_time: self.animation_time.unwrap_or(base.animation_time),
            acceleration_delta: self.acceleration_delta.unwrap_or(base.acceleration_delta),
            acceleration_max: self.acceleration_max.unwrap_or(base.acceleration_max),
            tail_head_ratio: self.tail_head_ratio.unwrap_or(base.tail_head_ratio),
        }
    }

    fn is_empty(&self) -> bool {
        self.step_size.is_none()
            && self.animation_time.is_none()
            && self.acceleration_delta.is_none()
            && self.acceleration_max.is_none()
            && self.tail_head_ratio.is_none()
    }
}

/// The complete, immutable configuration snapshot the engine consumes. A
/// new `GlobalSettings` is atomically swapped in by the engine façade's
/// `set_settings`; an in-flight animation keeps the snapshot it captured
/// at enqueue time and is unaffected by a later swap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalSettings {
    pub defaults: ScrollParameters,
    pub animation_easing: bool,
    pub shift_horizontal: bool,
    pub horizontal_smoothness: bool,
    pub enabled: bool,
    /// Lower-cased executable base names, e.g. `"notepad.exe"`.
    pub blacklist: HashSet<String>,
    /// Lower-cased executable base name -> sparse override.
    pub per_app_settings: HashMap<String, PerAppOverride>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            defaults: ScrollParameters::default(),
            animation_easing: true,
            shift_horizontal: true,
            horizontal_smoothness: true,
            enabled: true,
            blacklist: HashSet::new(),
            per_app_settings: HashMap::new(),
        }
    }
}

impl GlobalSettings {
    /// Inserts `exe` into the blacklist, lower-casing it first.
    pub fn blacklist_add(&mut self, exe: &str) {
        self.blacklist.insert(exe.to_lowercase());
    }

    /// True if `exe` (case-insensitive) is blacklisted.
    pub fn is_blacklisted(&self, exe: &str) -> bool {
        !self.blacklist.is_empty() && self.blacklist.contains(&exe.to_lowercase())
    }

    /// Inserts or replaces a sparse override for `exe`, lower-casing the
    /// key first.
    pub fn set_override(&mut self, exe: &str, over: PerAppOverride) {
        let key = exe.to_lowercase();
        if over.is_empty() {
            self.per_app_settings.remove(&key);
        } else {
            self.per_app_settings.insert(key, over);
        }
    }

    /// Resolves the effective [`ScrollParameters`] for `exe_name`: the
    /// global defaults with any per-app override applied on top, field by
    /// field. An unknown or empty `exe_name` returns the global defaults
    /// unchanged.
    pub fn resolve(&self, exe_name: &str) -> ScrollParameters {
        if exe_name.is_empty() {
            return self.defaults;
        }
        match self.per_app_settings.get(&exe_name.to_lowercase()) {
            Some(over) => over.apply(self.defaults),
            None => self.defaults,
        }
    }
}
