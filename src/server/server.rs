//! # Stego Core - Image Encoding Service
//!
//! The core service does ONE thing: run the steganography pipeline on image
//! bytes. HTTP handling, request parsing and response shaping live in the
//! web server binary.
//!
//! The codec is CPU bound, so every call is moved to tokio's blocking pool.

use anyhow::Result;
use log::info;
use uuid::Uuid;

use crate::common::config::StegoConfig;
use crate::processing::codec::{BitsPerChannel, CapacityReport};
use crate::processing::payload::PayloadFrame;
use crate::processing::{image_io, steganography};

/// Bits-per-channel values tried when decoding with auto-detection.
pub const AUTO_DETECT_CANDIDATES: [BitsPerChannel; 2] = [BitsPerChannel::TWO, BitsPerChannel::ONE];

/// Core service component that hides and recovers payloads.
///
/// Holds no per-request state; cloning is cheap.
#[derive(Debug, Clone)]
pub struct StegoCore {
    config: StegoConfig,
}

impl StegoCore {
    /// Create a service with the given codec settings.
    ///
    /// # Example
    /// ```ignore
    /// let core = StegoCore::new(StegoConfig::default());
    /// ```
    pub fn new(config: StegoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StegoConfig {
        &self.config
    }

    /// Hide `frame` in the cover image and return the result as PNG bytes.
    ///
    /// # Errors
    /// - The cover cannot be decoded
    /// - The frame cannot be built (empty message, oversized extension)
    /// - The payload does not fit ([`StegoError::CapacityExceeded`](crate::StegoError::CapacityExceeded))
    pub async fn encode_image(
        &self,
        request_id: Uuid,
        image_data: Vec<u8>,
        frame: PayloadFrame,
    ) -> Result<Vec<u8>> {
        info!(
            "📷 Request {} encoding {} frame into {} byte cover",
            request_id,
            frame.kind(),
            image_data.len()
        );

        let config = self.config.clone();
        let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let grid = image_io::load_grid_from_memory(&image_data)?;
            let stego = steganography::hide(&grid, &frame, &config)?;
            image_io::encode_png(&stego)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Encoding task panicked: {}", e))??;

        info!("✅ Request {} produced {} byte PNG", request_id, png.len());
        Ok(png)
    }

    /// Recover the frame hidden in an image.
    ///
    /// With `auto_detect` the configured bits per channel is ignored and
    /// [`AUTO_DETECT_CANDIDATES`] are tried instead.
    pub async fn decode_image(
        &self,
        request_id: Uuid,
        image_data: Vec<u8>,
        auto_detect: bool,
    ) -> Result<(BitsPerChannel, PayloadFrame)> {
        info!(
            "🔍 Request {} decoding {} byte image (auto-detect: {})",
            request_id,
            image_data.len(),
            auto_detect
        );

        let bits = self.config.bits_per_channel()?;
        let decoded = tokio::task::spawn_blocking(move || -> Result<(BitsPerChannel, PayloadFrame)> {
            let grid = image_io::load_grid_from_memory(&image_data)?;
            if auto_detect {
                Ok(steganography::reveal_auto(&grid, &AUTO_DETECT_CANDIDATES)?)
            } else {
                Ok((bits, steganography::reveal(&grid, bits)?))
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("Decoding task panicked: {}", e))??;

        info!(
            "✅ Request {} recovered {} frame at {} bits per channel",
            request_id,
            decoded.1.kind(),
            decoded.0
        );
        Ok(decoded)
    }

    /// Capacity of an image under the configured bits per channel.
    pub async fn capacity(&self, image_data: Vec<u8>) -> Result<CapacityReport> {
        let bits = self.config.bits_per_channel()?;
        tokio::task::spawn_blocking(move || -> Result<CapacityReport> {
            let grid = image_io::load_grid_from_memory(&image_data)?;
            Ok(CapacityReport::new(grid.width(), grid.height(), bits))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Capacity task panicked: {}", e))?
    }
}
