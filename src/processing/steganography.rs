//! # Steganography Pipeline
//!
//! Ties the payload framer and the bit codec together.
//!
//! ```text
//! encode: PayloadFrame -> frame bytes -> [zlib] -> + marker -> LSB embed -> PixelGrid
//! decode: PixelGrid -> LSB extract -> cut at marker -> [inflate] -> parse -> PayloadFrame
//! ```

use log::{debug, info};

use super::codec::{self, BitsPerChannel};
use super::grid::PixelGrid;
use super::payload::{self, PayloadFrame};
use crate::common::config::StegoConfig;
use crate::error::Result;

/// Hide `frame` in a copy of `grid`.
pub fn hide(grid: &PixelGrid, frame: &PayloadFrame, config: &StegoConfig) -> Result<PixelGrid> {
    let bits = config.bits_per_channel()?;
    let bytes = frame.to_bytes()?;

    info!(
        "Hiding {} frame of {} bytes at {} bits per channel",
        frame.kind(),
        bytes.len(),
        bits
    );

    codec::embed(grid, &bytes, config.compress, bits)
}

/// Recover the frame hidden in `grid`.
///
/// Only a `FILE:` frame with an impossible extension length is an error;
/// everything else comes back as some [`PayloadFrame`] variant.
pub fn reveal(grid: &PixelGrid, bits: BitsPerChannel) -> Result<PayloadFrame> {
    let data = codec::extract(grid, bits);
    let frame = payload::parse(&data)?;

    info!("Revealed {} frame ({} bytes)", frame.kind(), data.len());
    Ok(frame)
}

/// Recover a frame without knowing the encoder's bits per channel.
///
/// Each candidate is tried in order. The first one whose extraction finds the
/// termination marker and parses as a tagged frame wins. Failing that, the
/// first candidate that found the marker is used, which keeps untagged
/// payloads from older revisions readable. When no candidate finds the
/// marker, the first candidate's best-effort result is returned.
pub fn reveal_auto(
    grid: &PixelGrid,
    candidates: &[BitsPerChannel],
) -> Result<(BitsPerChannel, PayloadFrame)> {
    let fallback = candidates.first().copied().unwrap_or_default();
    let mut untagged: Option<(BitsPerChannel, PayloadFrame)> = None;

    for &bits in candidates {
        let extraction = codec::extract_detailed(grid, bits);
        if !extraction.marker_found {
            debug!("No marker at {} bits per channel", bits);
            continue;
        }

        match payload::parse(&extraction.data) {
            Ok(frame @ (PayloadFrame::Text(_) | PayloadFrame::File { .. })) => {
                info!("Detected {} frame at {} bits per channel", frame.kind(), bits);
                return Ok((bits, frame));
            }
            Ok(frame) => {
                debug!("Untagged {} data at {} bits per channel", frame.kind(), bits);
                if untagged.is_none() {
                    untagged = Some((bits, frame));
                }
            }
            Err(e) => debug!("Rejected {} bits per channel: {}", bits, e),
        }
    }

    if let Some((bits, frame)) = untagged {
        info!("Detected untagged {} data at {} bits per channel", frame.kind(), bits);
        return Ok((bits, frame));
    }

    Ok((fallback, reveal(grid, fallback)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StegoError;

    fn cover() -> PixelGrid {
        let pixels = (0..64 * 48u32)
            .map(|i| [(i * 7) as u8, (i * 13) as u8, (i * 29) as u8])
            .collect();
        PixelGrid::new(64, 48, pixels).unwrap()
    }

    #[test]
    fn test_hide_and_reveal_text() {
        let grid = cover();
        let frame = PayloadFrame::text("hello").unwrap();

        for bits in [1u8, 2] {
            for compress in [true, false] {
                let config = StegoConfig {
                    bits_per_channel: bits,
                    compress,
                };
                let stego = hide(&grid, &frame, &config).unwrap();
                let revealed = reveal(&stego, config.bits_per_channel().unwrap()).unwrap();
                assert_eq!(revealed, frame);
            }
        }
    }

    #[test]
    fn test_hide_and_reveal_file() {
        let grid = cover();
        let frame = PayloadFrame::file(".bin", vec![0x00, 0x01, 0xAA, 0xBB]).unwrap();
        let config = StegoConfig::default();

        let stego = hide(&grid, &frame, &config).unwrap();
        assert_eq!(reveal(&stego, BitsPerChannel::TWO).unwrap(), frame);
    }

    #[test]
    fn test_hide_rejects_bad_config() {
        let config = StegoConfig {
            bits_per_channel: 0,
            compress: true,
        };
        let frame = PayloadFrame::text("x").unwrap();
        assert_eq!(
            hide(&cover(), &frame, &config),
            Err(StegoError::InvalidBitsPerChannel(0))
        );
    }

    #[test]
    fn test_reveal_auto_detects_bits_per_channel() {
        let grid = cover();
        let frame = PayloadFrame::text("written by the browser build").unwrap();
        let config = StegoConfig {
            bits_per_channel: 1,
            compress: true,
        };
        let stego = hide(&grid, &frame, &config).unwrap();

        let (bits, revealed) =
            reveal_auto(&stego, &[BitsPerChannel::TWO, BitsPerChannel::ONE]).unwrap();
        assert_eq!(bits, BitsPerChannel::ONE);
        assert_eq!(revealed, frame);
    }

    #[test]
    fn test_reveal_auto_reads_untagged_one_bit_images() {
        let grid = PixelGrid::filled(32, 32, [10, 20, 30]);
        let stego =
            codec::embed(&grid, b"plain text, no tag", false, BitsPerChannel::ONE).unwrap();

        let (bits, revealed) =
            reveal_auto(&stego, &[BitsPerChannel::TWO, BitsPerChannel::ONE]).unwrap();
        assert_eq!(bits, BitsPerChannel::ONE);
        assert_eq!(revealed, PayloadFrame::Legacy("plain text, no tag".to_string()));
    }

    #[test]
    fn test_reveal_auto_falls_back_to_first_candidate() {
        let grid = PixelGrid::filled(8, 8, [0x20, 0x20, 0x20]);
        let (bits, _) = reveal_auto(&grid, &[BitsPerChannel::TWO, BitsPerChannel::ONE]).unwrap();
        assert_eq!(bits, BitsPerChannel::TWO);
    }
}
