//! The interception-and-animation engine behind OpenSmoothScroll: a
//! low-level wheel hook, per-axis physics-inspired scroll animation, and
//! per-application parameter resolution.
//!
//! The hook-facing, OS-specific glue lives behind [`platform::Platform`];
//! everything else in this crate — [`easing`], [`accelerator`], [`axis`],
//! and the dispatch decisions in [`hook`] — is pure and runs the same way
//! on every host, so it can be unit-tested without a Windows machine.

pub mod accelerator;
pub mod axis;
pub mod clock;
pub mod easing;
pub mod engine;
pub mod error;
pub mod hook;
pub mod platform;
pub mod process;
pub mod types;

pub use engine::Engine;
pub use error::EngineError;
pub use types::{GlobalSettings, PerAppOverride, ScrollParameters};
