//! Desktop integration module
//!
//! Traits for the OS collaborators the skipper drives, plus their real
//! implementations: `enigo` for the pointer, `xcap` for screen capture and
//! the Win32 API (or `xcap` elsewhere) for foreground windows.

pub mod input;
pub mod screen;
pub mod window;

pub use input::DesktopPointer;
pub use screen::{detect_primary_resolution, ScreenCapturer};
pub use window::DesktopWindows;

use crate::vision::SampleError;

/// Synthetic pointer input
pub trait Pointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError>;

    /// Left click at the current pointer position
    fn click(&mut self) -> Result<(), ActuationError>;
}

/// Foreground window queries and activation
pub trait WindowManager {
    fn active_window_title(&mut self) -> Result<String, SampleError>;

    /// Best-effort raise of the window with this exact title
    fn bring_to_foreground(&mut self, title: &str) -> Result<(), ActivationError>;
}

/// Pointer input rejected by the OS
#[derive(Debug, thiserror::Error)]
pub enum ActuationError {
    #[error("Failed to connect to the input backend: {0}")]
    Backend(String),
    #[error("Failed to move pointer to ({x}, {y}): {reason}")]
    Move { x: i32, y: i32, reason: String },
    #[error("Failed to click: {0}")]
    Click(String),
}

/// Foreground activation failures
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("No window titled '{0}'")]
    NotFound(String),
    #[error("The OS refused to raise '{0}'")]
    Refused(String),
    #[error("Window activation is not supported on this platform")]
    Unsupported,
}
