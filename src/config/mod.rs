//! Configuration module
//!
//! Handles user settings and the first-run screen resolution setup.

pub mod settings;
pub mod setup;

pub use settings::{Settings, TimingSettings, SETTINGS_FILE};
pub use setup::{ResolutionOrigin, ResolutionSources, ScreenSetup};

use std::path::{Path, PathBuf};

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),
    #[error("Stealth intervals must be positive, ordered ranges")]
    InvalidStealth,
    #[error("Target window title is empty")]
    EmptyTargetWindow,
    #[error("Could not detect the screen resolution: {0}")]
    Detection(String),
    #[error("Resolution prompt failed: {0}")]
    Prompt(String),
    #[error(transparent)]
    Hotkey(#[from] crate::control::HotkeyError),
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        ConfigError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}
