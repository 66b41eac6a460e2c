//! Vision module
//!
//! Turns single screen pixels into the three yes/no signals that drive the
//! skipper: autoplay running, dialogue option waiting, loading screen up.

pub mod capture;
pub mod geometry;

pub use capture::{colors, Frame, PixelReader, PixelSource, Rgb};
pub use geometry::{CoordinateModel, HitBox, Probe, Resolution, ScreenGeometry};

/// What one frame says about the dialogue UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub autoplay_active: bool,
    pub manual_option_available: bool,
}

impl Signals {
    /// A click would advance dialogue
    pub fn should_click(&self) -> bool {
        self.autoplay_active || self.manual_option_available
    }
}

/// Reads probe pixels and compares them against reference colors
#[derive(Debug, Clone, Copy)]
pub struct SignalSampler {
    geometry: ScreenGeometry,
}

impl SignalSampler {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }

    fn probe_is(
        &self,
        frame: &impl PixelReader,
        probe: Probe,
        color: Rgb,
    ) -> Result<bool, SampleError> {
        Ok(frame.read_pixel(probe.x, probe.y)? == color)
    }

    /// The autoplay icon is showing
    pub fn is_autoplay_active(&self, frame: &impl PixelReader) -> Result<bool, SampleError> {
        self.probe_is(frame, self.geometry.playing_icon, colors::AUTOPLAY_ICON)
    }

    /// A loading screen covers the UI
    pub fn is_loading(&self, frame: &impl PixelReader) -> Result<bool, SampleError> {
        self.probe_is(frame, self.geometry.loading_screen, colors::WHITE)
    }

    /// A dialogue option is waiting for a click.
    ///
    /// The bubble sits at one of two heights depending on the dialogue
    /// layout, so both rows are probed. A loading screen overrides both.
    pub fn is_manual_option_available(
        &self,
        frame: &impl PixelReader,
    ) -> Result<bool, SampleError> {
        if self.is_loading(frame)? {
            return Ok(false);
        }
        if self.probe_is(frame, self.geometry.dialogue_icon_lower(), colors::WHITE)? {
            return Ok(true);
        }
        self.probe_is(frame, self.geometry.dialogue_icon_higher(), colors::WHITE)
    }

    /// Evaluate all signals, short-circuiting once autoplay is seen
    pub fn sample(&self, frame: &impl PixelReader) -> Result<Signals, SampleError> {
        if self.is_autoplay_active(frame)? {
            return Ok(Signals {
                autoplay_active: true,
                manual_option_available: false,
            });
        }
        Ok(Signals {
            autoplay_active: false,
            manual_option_available: self.is_manual_option_available(frame)?,
        })
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }
}

/// Screen reading errors
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Screen capture unavailable: {0}")]
    CaptureUnavailable(String),
    #[error("Foreground window query failed: {0}")]
    WindowQuery(String),
    #[error("Probe ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfFrame {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },
}
