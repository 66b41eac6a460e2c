//! User settings
//!
//! Defines all configurable options for the skipper. Settings are stored as
//! JSON next to the executable's working directory; every field has a
//! default so partial files load fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::control::HotkeyBindings;
use crate::stealth::StealthConfig;
use crate::vision::Resolution;

/// Default settings file name
pub const SETTINGS_FILE: &str = "crabe.json";

/// Window title of the game client
pub const DEFAULT_TARGET_WINDOW: &str = "Genshin Impact";

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Confirmed screen resolution (asked for on first run)
    pub resolution: Option<Resolution>,
    /// Only click while this window is in the foreground
    pub target_window: String,
    /// Global hotkeys
    pub hotkeys: HotkeyBindings,
    /// Loop timing
    pub timings: TimingSettings,
    /// Cursor repositioning
    pub stealth: StealthConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: None,
            target_window: DEFAULT_TARGET_WINDOW.to_string(),
            hotkeys: HotkeyBindings::default(),
            timings: TimingSettings::default(),
            stealth: StealthConfig::default(),
        }
    }
}

impl Settings {
    /// Settings that never move the cursor on their own
    pub fn no_jitter() -> Self {
        Self {
            stealth: StealthConfig::disabled(),
            ..Default::default()
        }
    }

    /// Load settings from a JSON file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|e| ConfigError::json(path, e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| ConfigError::json(path, e))?;
        fs::write(path, text).map_err(|e| ConfigError::io(path, e))?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Reject values the skipper cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(resolution) = self.resolution {
            if !resolution.is_valid() {
                return Err(ConfigError::InvalidResolution(resolution.to_string()));
            }
        }
        if !self.stealth.is_valid() {
            return Err(ConfigError::InvalidStealth);
        }
        if self.target_window.trim().is_empty() {
            return Err(ConfigError::EmptyTargetWindow);
        }
        Ok(())
    }
}

/// Timing settings for the control and action loops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Sleep between state checks while paused (ms)
    pub paused_poll_ms: u64,
    /// Sleep while the game is not in the foreground (ms)
    pub unfocused_poll_ms: u64,
    /// Sleep after a failed screen read (ms)
    pub error_backoff_ms: u64,
    /// How long shutdown waits for the action loop (ms)
    pub shutdown_timeout_ms: u64,
    /// How long the keybinding help stays up (ms)
    pub help_display_ms: u64,
    /// Idle time before the status label fades (ms)
    pub overlay_fade_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            paused_poll_ms: 500,
            unfocused_poll_ms: 50,
            error_backoff_ms: 100,
            shutdown_timeout_ms: 2000,
            help_display_ms: 3000,
            overlay_fade_ms: 2000,
        }
    }
}
