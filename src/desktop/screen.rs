//! Screen capture through xcap

use xcap::Monitor;

use crate::vision::{Frame, PixelSource, Resolution, SampleError};

fn primary_monitor() -> Result<Monitor, SampleError> {
    let monitors = Monitor::all().map_err(|e| SampleError::CaptureUnavailable(e.to_string()))?;
    let mut fallback = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return Ok(monitor);
        }
        fallback.get_or_insert(monitor);
    }
    fallback.ok_or_else(|| SampleError::CaptureUnavailable("no monitors found".into()))
}

/// Resolution of the primary monitor
pub fn detect_primary_resolution() -> Result<Resolution, SampleError> {
    let monitor = primary_monitor()?;
    let width = monitor
        .width()
        .map_err(|e| SampleError::CaptureUnavailable(e.to_string()))?;
    let height = monitor
        .height()
        .map_err(|e| SampleError::CaptureUnavailable(e.to_string()))?;
    Ok(Resolution::new(width, height))
}

/// Captures the primary monitor once per tick
pub struct ScreenCapturer {
    monitor: Option<Monitor>,
}

impl ScreenCapturer {
    pub fn new() -> Self {
        Self { monitor: None }
    }
}

impl Default for ScreenCapturer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelSource for ScreenCapturer {
    type Frame = Frame;

    fn capture(&mut self) -> Result<Frame, SampleError> {
        let monitor = match self.monitor.take() {
            Some(monitor) => monitor,
            None => primary_monitor()?,
        };
        match monitor.capture_image() {
            Ok(image) => {
                self.monitor = Some(monitor);
                // raw bytes keep the frame independent of xcap's image version
                Frame::from_raw(image.width(), image.height(), image.into_raw())
            }
            // the monitor handle is re-acquired on the next tick
            Err(e) => Err(SampleError::CaptureUnavailable(e.to_string())),
        }
    }
}
