//! # Image Container I/O
//!
//! Converts between image files and [`PixelGrid`]. Any format the `image`
//! crate can decode is accepted as a cover (it is converted to 8-bit RGB,
//! dropping alpha). Output is always PNG: a lossy container would destroy
//! the hidden bits.

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

use super::grid::PixelGrid;

/// Decode an image file into a pixel grid.
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<PixelGrid> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
    grid_from_image(&img.to_rgb8())
}

/// Decode in-memory image bytes into a pixel grid.
pub fn load_grid_from_memory(bytes: &[u8]) -> Result<PixelGrid> {
    let img = image::load_from_memory(bytes).context("Failed to decode image data")?;
    grid_from_image(&img.to_rgb8())
}

/// Write `grid` to `path` as PNG, regardless of the path's extension.
pub fn save_png<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<()> {
    let path = path.as_ref();
    image_from_grid(grid)?
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG {}", path.display()))?;
    Ok(())
}

/// Encode `grid` as PNG bytes.
pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();
    image_from_grid(grid)?
        .write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(output_bytes)
}

fn grid_from_image(img: &RgbImage) -> Result<PixelGrid> {
    let (width, height) = img.dimensions();
    Ok(PixelGrid::from_raw(width, height, img.as_raw())?)
}

fn image_from_grid(grid: &PixelGrid) -> Result<RgbImage> {
    RgbImage::from_raw(grid.width(), grid.height(), grid.to_raw())
        .context("Pixel buffer does not match grid dimensions")
}
