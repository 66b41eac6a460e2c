//! Control module
//!
//! Run state shared with the action loop, the state machine applying hotkey
//! actions to it, and the global key listener feeding that state machine.

pub mod hotkey;
pub mod state;

pub use hotkey::{HotkeyAction, HotkeyBindings, HotkeyError, Keymap};
pub use state::{Controller, RunState, SharedRunState, SkipperContext, Transition};
