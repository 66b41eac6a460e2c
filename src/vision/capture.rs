//! Screen capture handling
//!
//! Wraps a captured desktop frame and exposes single-pixel reads to the
//! signal sampler.

use image::{ImageBuffer, Rgba, RgbaImage};

use super::SampleError;

/// An opaque RGB color as read from the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

impl From<Rgba<u8>> for Rgb {
    fn from(pixel: Rgba<u8>) -> Self {
        Rgb(pixel[0], pixel[1], pixel[2])
    }
}

/// Reference colors the sampler compares probes against
pub mod colors {
    use super::Rgb;

    /// Fill color of the autoplay icon in the top-left corner
    pub const AUTOPLAY_ICON: Rgb = Rgb(236, 229, 216);
    /// Dialogue option bubble and loading screen fill
    pub const WHITE: Rgb = Rgb::WHITE;
}

/// Anything single pixels can be read from
pub trait PixelReader {
    fn read_pixel(&self, x: i32, y: i32) -> Result<Rgb, SampleError>;
}

/// Produces one readable frame per tick
pub trait PixelSource {
    type Frame: PixelReader;

    fn capture(&mut self) -> Result<Self::Frame, SampleError>;
}

/// A captured screen frame
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    /// Build a frame from raw RGBA bytes
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, SampleError> {
        let expected = (width as usize) * (height as usize) * 4;
        let actual = data.len();
        if actual != expected {
            return Err(SampleError::InvalidFrame { expected, actual });
        }

        let image: RgbaImage = ImageBuffer::from_raw(width, height, data)
            .ok_or(SampleError::InvalidFrame { expected, actual })?;

        Ok(Self { image })
    }

    /// Frame filled with a single color
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let Rgb(r, g, b) = color;
        Self {
            image: ImageBuffer::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    /// Paint one pixel, ignoring coordinates outside the frame
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        let Some((x, y)) = self.index(x, y) else {
            return;
        };
        let Rgb(r, g, b) = color;
        self.image.put_pixel(x, y, Rgba([r, g, b, 255]));
    }

    /// Get frame dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn index(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        let (width, height) = self.image.dimensions();
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < width && y < height).then_some((x, y))
    }
}

impl PixelReader for Frame {
    fn read_pixel(&self, x: i32, y: i32) -> Result<Rgb, SampleError> {
        let (width, height) = self.image.dimensions();
        let (px, py) = self.index(x, y).ok_or(SampleError::OutOfFrame {
            x,
            y,
            width,
            height,
        })?;
        Ok(Rgb::from(*self.image.get_pixel(px, py)))
    }
}
