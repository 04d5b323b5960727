//! # Pixel Grid
//!
//! A decoded raster of 8-bit RGB triples in row-major order. This is the only
//! image representation the codec sees; turning it into file bytes is the job
//! of [`image_io`](super::image_io).

use crate::error::{Result, StegoError};

/// One pixel: red, green, blue.
pub type Rgb = [u8; 3];

/// Width x height RGB pixels, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    /// Build a grid from row-major pixels.
    ///
    /// Fails with [`StegoError::InvalidGrid`] when `pixels.len() != width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(StegoError::InvalidGrid {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Build a grid from interleaved `RGBRGB...` bytes.
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if raw.len() != expected * 3 {
            return Err(StegoError::InvalidGrid {
                expected,
                actual: raw.len() / 3,
            });
        }

        let pixels = raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Interleaved `RGBRGB...` bytes.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}
