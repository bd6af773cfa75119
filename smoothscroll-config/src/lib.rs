//! Ambient configuration layer for OpenSmoothScroll: TOML-backed
//! settings persistence ([`file`]) and the `config.ini` interchange
//! format ([`ini`]) that lets a user hand-edit or re-import their
//! settings outside the running application.

pub mod file;
pub mod ini;

pub use file::{default_path, load, save};
