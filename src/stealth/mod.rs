//! Stealth and anti-detection module
//!
//! Clicking the exact same pixel forever is an easy pattern to spot. This
//! module provides:
//! - Irregular reposition intervals drawn from a skewed distribution
//! - Uniformly random cursor positions inside the dialogue hit-box
//! - The timer deciding when the next reposition is due

pub mod humanize;

pub use humanize::*;

use serde::{Deserialize, Serialize};

/// Configuration for cursor repositioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    /// Move the cursor around the hit-box between clicks
    pub reposition_enabled: bool,
    /// Usual base interval range in seconds
    pub base_interval: [f64; 2],
    /// Occasional longer base interval range in seconds
    pub long_interval: [f64; 2],
    /// One draw in this many uses the long range
    pub long_pause_odds: u32,
    /// Base interval multiplier giving the reposition period
    pub interval_scale: f64,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            reposition_enabled: true,
            base_interval: [0.12, 0.18],
            long_interval: [0.18, 0.2],
            long_pause_odds: 6,
            interval_scale: 40.0,
        }
    }
}

impl StealthConfig {
    /// Create a config with no repositioning (for debugging click placement)
    pub fn disabled() -> Self {
        Self {
            reposition_enabled: false,
            ..Self::default()
        }
    }

    /// Shortest reposition period the config can produce
    pub fn min_period_secs(&self) -> f64 {
        self.base_interval[0].min(self.long_interval[0]) * self.interval_scale
    }

    /// Longest reposition period the config can produce
    pub fn max_period_secs(&self) -> f64 {
        self.base_interval[1].max(self.long_interval[1]) * self.interval_scale
    }

    /// Ranges are ordered and positive, odds and scale are usable
    pub fn is_valid(&self) -> bool {
        let ordered = |[lo, hi]: [f64; 2]| lo > 0.0 && lo < hi;
        ordered(self.base_interval)
            && ordered(self.long_interval)
            && self.long_pause_odds > 0
            && self.interval_scale > 0.0
    }
}
