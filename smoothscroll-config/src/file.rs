//! TOML-backed persistence of [`GlobalSettings`]: the ambient "load my
//! settings on startup, save them when they change" layer a long-running
//! host needs, independent of the `config.ini` interchange format in
//! [`crate::ini`].

use std::path::{Path, PathBuf};

use log::{info, warn};
use smoothscroll_core::GlobalSettings;

/// The directory name used under the platform config directory, mirroring
/// how a desktop utility like this one names its own subdirectory there.
const APP_DIR_NAME: &str = "OpenSmoothScroll";
const SETTINGS_FILE_NAME: &str = "settings.toml";

/// The default settings file location: `<platform config dir>/OpenSmoothScroll/settings.toml`,
/// falling back to a bare relative filename if the platform config
/// directory can't be determined.
pub fn default_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME),
        None => PathBuf::from(SETTINGS_FILE_NAME),
    }
}

/// Loads settings from `path`, or [`GlobalSettings::default`] if the file
/// doesn't exist or fails to parse. A parse failure is logged and treated
/// as "use the defaults" rather than propagated, since a corrupt settings
/// file must never prevent the engine from starting.
pub fn load(path: &Path) -> GlobalSettings {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            info!("no settings file at {path:?}, using defaults");
            return GlobalSettings::default();
        }
    };

    match toml::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("failed to parse settings file {path:?}: {err}; using defaults");
            GlobalSettings::default()
        }
    }
}

/// Saves `settings` to `path`, creating parent directories as needed.
pub fn save(path: &Path, settings: &GlobalSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(settings)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let loaded = load(&path);
        assert_eq!(loaded, GlobalSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = GlobalSettings::default();
        settings.defaults.step_size = 77;
        settings.enabled = false;
        settings.blacklist_add("vlc.exe");

        save(&path, &settings).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded, settings);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        let loaded = load(&path);
        assert_eq!(loaded, GlobalSettings::default());
    }
}
