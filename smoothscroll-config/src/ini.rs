//! Hand-rolled `config.ini` export/import: a `[Global]` section plus one
//! `[PerApp:<exe>]` section per application override. Deliberately not a
//! general-purpose INI parser — just enough structure to round-trip
//! [`GlobalSettings`], matching the narrow format the original tray tool
//! produces and consumes.

use std::collections::HashMap;
use std::fmt::Write as _;

use smoothscroll_core::{GlobalSettings, PerAppOverride};

/// Serializes `settings` into `config.ini` text: a `[Global]` section with
/// every top-level field, then one `[PerApp:<exe>]` section per override.
pub fn export(settings: &GlobalSettings) -> String {
    let mut out = String::new();
    out.push_str("; OpenSmoothScroll configuration\n");
    out.push_str("; Edit by hand, or re-export from the running application.\n");
    out.push_str("; A [PerApp:name.exe] section overrides the global parameters for that\n");
    out.push_str("; executable only.\n\n");

    out.push_str("[Global]\n");
    let d = settings.defaults;
    let _ = writeln!(out, "step_size = {}", d.step_size);
    let _ = writeln!(out, "animation_time = {}", d.animation_time);
    let _ = writeln!(out, "acceleration_delta = {}", d.acceleration_delta);
    let _ = writeln!(out, "acceleration_max = {}", d.acceleration_max);
    let _ = writeln!(out, "tail_head_ratio = {}", d.tail_head_ratio);
    let _ = writeln!(out, "animation_easing = {}", settings.animation_easing);
    let _ = writeln!(out, "shift_horizontal = {}", settings.shift_horizontal);
    let _ = writeln!(
        out,
        "horizontal_smoothness = {}",
        settings.horizontal_smoothness
    );
    let _ = writeln!(out, "enabled = {}", settings.enabled);

    let mut blacklist: Vec<&str> = settings.blacklist.iter().map(String::as_str).collect();
    blacklist.sort_unstable();
    let _ = writeln!(out, "blacklist = {}", blacklist.join(", "));
    out.push('\n');

    let mut exes: Vec<&String> = settings.per_app_settings.keys().collect();
    exes.sort();
    for exe in exes {
        let over = &settings.per_app_settings[exe];
        let _ = writeln!(out, "[PerApp:{exe}]");
        if let Some(v) = over.step_size {
            let _ = writeln!(out, "step_size = {v}");
        }
        if let Some(v) = over.animation_time {
            let _ = writeln!(out, "animation_time = {v}");
        }
        if let Some(v) = over.acceleration_delta {
            let _ = writeln!(out, "acceleration_delta = {v}");
        }
        if let Some(v) = over.acceleration_max {
            let _ = writeln!(out, "acceleration_max = {v}");
        }
        if let Some(v) = over.tail_head_ratio {
            let _ = writeln!(out, "tail_head_ratio = {v}");
        }
        out.push('\n');
    }

    out
}

/// Parses `config.ini` text into a [`GlobalSettings`], starting from
/// [`GlobalSettings::default`] and overwriting only the keys present and
/// parseable. Unknown keys are ignored; a key whose value fails to parse
/// is skipped rather than aborting the whole import, per the format's
/// original tolerance for hand-edited files.
pub fn import(text: &str) -> GlobalSettings {
    let mut settings = GlobalSettings::default();
    let mut current_section = String::new();
    let mut per_app: HashMap<String, PerAppOverride> = HashMap::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            current_section = name.trim().to_string();
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if current_section == "Global" {
            apply_global_key(&mut settings, key, value);
        } else if let Some(exe) = current_section.strip_prefix("PerApp:") {
            let exe = exe.trim().to_lowercase();
            if !exe.is_empty() {
                apply_per_app_key(per_app.entry(exe).or_default(), key, value);
            }
        }
    }

    for (exe, over) in per_app {
        settings.set_override(&exe, over);
    }

    settings
}

fn apply_global_key(settings: &mut GlobalSettings, key: &str, value: &str) {
    match key {
        "step_size" => assign(value, |v| settings.defaults.step_size = v),
        "animation_time" => assign(value, |v| settings.defaults.animation_time = v),
        "acceleration_delta" => assign(value, |v| settings.defaults.acceleration_delta = v),
        "acceleration_max" => assign(value, |v| settings.defaults.acceleration_max = v),
        "tail_head_ratio" => assign(value, |v| settings.defaults.tail_head_ratio = v),
        "animation_easing" => assign(value, |v| settings.animation_easing = v),
        "shift_horizontal" => assign(value, |v| settings.shift_horizontal = v),
        "horizontal_smoothness" => assign(value, |v| settings.horizontal_smoothness = v),
        "enabled" => assign(value, |v| settings.enabled = v),
        "blacklist" => {
            for name in value.split(',') {
                let name = name.trim();
                if !name.is_empty() {
                    settings.blacklist_add(name);
                }
            }
        }
        _ => {}
    }
}

fn apply_per_app_key(over: &mut PerAppOverride, key: &str, value: &str) {
    match key {
        "step_size" => assign(value, |v| over.step_size = Some(v)),
        "animation_time" => assign(value, |v| over.animation_time = Some(v)),
        "acceleration_delta" => assign(value, |v| over.acceleration_delta = Some(v)),
        "acceleration_max" => assign(value, |v| over.acceleration_max = Some(v)),
        "tail_head_ratio" => assign(value, |v| over.tail_head_ratio = Some(v)),
        _ => {}
    }
}

/// Parses `value` as `T` and runs `set` with it, leaving the target
/// untouched (rather than erroring) when parsing fails.
fn assign<T: std::str::FromStr>(value: &str, mut set: impl FnMut(T)) {
    if let Ok(parsed) = value.parse() {
        set(parsed);
    }
}
