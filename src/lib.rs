//! Crabe Skipper - hotkey-driven dialogue skipping for Genshin Impact
//!
//! This library provides the core of the skipper: resolution-aware probe
//! coordinates, pixel color signals, the run state machine driven by global
//! hotkeys and the action loop clicking through dialogue.
//!
//! ## Anti-Detection
//!
//! The `stealth` module moves the cursor to random points of the dialogue
//! box on an irregular schedule so clicks do not form a periodic pattern.

pub mod config;
pub mod control;
pub mod desktop;
pub mod overlay;
pub mod skipper;
pub mod stealth;
pub mod vision;

pub use control::{Controller, HotkeyAction, RunState, SharedRunState, SkipperContext};
pub use skipper::{ActionLoop, LoopConfig, LoopStats, TickOutcome};
pub use vision::{Resolution, ScreenGeometry, SignalSampler};
