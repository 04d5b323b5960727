//! # LSB Bit Codec
//!
//! Hides a byte sequence in the low bits of the RGB channels of a
//! [`PixelGrid`] and recovers it again.
//!
//! ## Embedding
//! 1. Optionally compress the frame (zlib, best level). A failed compression
//!    falls back to the raw frame.
//! 2. Append the 6-byte termination marker `AA BB CC DD EE FF`.
//! 3. Check capacity: `floor(width * height * 3 * bits_per_channel / 8)` bytes.
//! 4. Walk pixels row-major, channels red, green, blue. Each channel has its
//!    low `bits_per_channel` bits replaced by the next group of payload bits
//!    (MSB first). Channels after the last group are left untouched.
//!
//! ## Extraction
//! The same walk reads the low bits back into bytes. Every
//! [`SCAN_CHUNK_BITS`] bits the newly completed bytes are searched for the
//! marker so that large images stop early. Everything before the first marker
//! is inflated if it is a zlib stream and returned raw otherwise. Without a
//! marker the whole decoded stream is returned.
//!
//! `bits_per_channel` is not recorded in the image. The decoder must use the
//! value the encoder used.

use log::{debug, info, warn};
use serde::Serialize;

use super::bits::{BitPacker, BitReader};
use super::compression;
use super::grid::PixelGrid;
use crate::error::{Result, StegoError};

/// Appended after the (optionally compressed) frame, never compressed itself.
pub const TERMINATION_MARKER: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

/// Granularity of the early marker search during extraction.
pub const SCAN_CHUNK_BITS: usize = 1024;

/// Number of color channels carrying data per pixel.
const CHANNELS: usize = 3;

/// Low-order bits per channel used for payload data (1..=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitsPerChannel(u8);

impl BitsPerChannel {
    /// The browser revision's setting.
    pub const ONE: Self = Self(1);
    /// The desktop revision's setting.
    pub const TWO: Self = Self(2);

    pub fn new(bits: u8) -> Result<Self> {
        if (1..=8).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(StegoError::InvalidBitsPerChannel(bits))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Mask selecting the carrier bits of a channel.
    pub fn mask(self) -> u8 {
        ((1u16 << self.0) - 1) as u8
    }
}

impl Default for BitsPerChannel {
    fn default() -> Self {
        Self::TWO
    }
}

impl TryFrom<u8> for BitsPerChannel {
    type Error = StegoError;

    fn try_from(bits: u8) -> Result<Self> {
        Self::new(bits)
    }
}

impl std::fmt::Display for BitsPerChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum payload bytes (termination marker included) an image can carry.
pub fn capacity(width: u32, height: u32, bits: BitsPerChannel) -> usize {
    let total_bits =
        u64::from(width) * u64::from(height) * CHANNELS as u64 * u64::from(bits.get());
    usize::try_from(total_bits / 8).unwrap_or(usize::MAX)
}

/// Capacity of a concrete image, for display and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    pub bits_per_channel: u8,
    /// Payload bytes available, termination marker included
    pub max_bytes: usize,
}

impl CapacityReport {
    pub fn new(width: u32, height: u32, bits: BitsPerChannel) -> Self {
        Self {
            width,
            height,
            bits_per_channel: bits.get(),
            max_bytes: capacity(width, height, bits),
        }
    }

    /// Largest frame that still fits once the marker is appended.
    pub fn max_frame_bytes(&self) -> usize {
        self.max_bytes.saturating_sub(TERMINATION_MARKER.len())
    }
}

impl std::fmt::Display for CapacityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Size: {}x{} pixels | Max capacity: {:.1} KB",
            self.width,
            self.height,
            self.max_bytes as f64 / 1024.0
        )
    }
}

/// Number of channels needed to carry `payload_len` bytes.
pub fn required_channels(payload_len: usize, bits: BitsPerChannel) -> usize {
    (payload_len * 8).div_ceil(bits.get() as usize)
}

/// Embed `frame` into a copy of `grid`.
///
/// The caller's grid is never modified. Fails with
/// [`StegoError::CapacityExceeded`] before any pixel is touched when the
/// payload plus marker does not fit.
pub fn embed(
    grid: &PixelGrid,
    frame: &[u8],
    compress: bool,
    bits: BitsPerChannel,
) -> Result<PixelGrid> {
    let packed = if compress {
        compression::compress(frame)
    } else {
        compression::Packed {
            bytes: frame.to_vec(),
            transformed: false,
        }
    };

    let mut payload = packed.bytes;
    payload.extend_from_slice(&TERMINATION_MARKER);

    let max = capacity(grid.width(), grid.height(), bits);
    if payload.len() > max {
        return Err(StegoError::CapacityExceeded {
            required: payload.len(),
            max,
        });
    }

    debug!(
        "Embedding {} bytes ({} channels at {} bits, compressed: {}) into {}x{} grid",
        payload.len(),
        required_channels(payload.len(), bits),
        bits,
        packed.transformed,
        grid.width(),
        grid.height()
    );

    let mut output = grid.clone();
    let mask = bits.mask();
    let mut reader = BitReader::new(&payload);

    'outer: for pixel in output.pixels_mut() {
        for channel in pixel.iter_mut() {
            match reader.next_group(bits.get()) {
                Some(group) => *channel = (*channel & !mask) | group,
                None => break 'outer,
            }
        }
    }

    info!("Embedded {} of {} available bytes", payload.len(), max);

    Ok(output)
}

/// Result of walking a grid for hidden data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Recovered bytes, inflated when they formed a zlib stream.
    pub data: Vec<u8>,
    /// Whether the termination marker was located.
    pub marker_found: bool,
    /// Whether `data` was produced by inflating the marker-stripped bytes.
    pub decompressed: bool,
}

/// Recover the bytes hidden in `grid`. Never fails.
pub fn extract(grid: &PixelGrid, bits: BitsPerChannel) -> Vec<u8> {
    extract_detailed(grid, bits).data
}

/// Like [`extract`], but also reports how the bytes were found.
pub fn extract_detailed(grid: &PixelGrid, bits: BitsPerChannel) -> Extraction {
    let mask = bits.mask();
    let width = bits.get();
    let mut packer = BitPacker::with_capacity(capacity(grid.width(), grid.height(), bits) + 1);

    let scan_chunk_bytes = SCAN_CHUNK_BITS / 8;
    let mut searched_to = 0usize;

    for pixel in grid.pixels() {
        for &channel in pixel {
            packer.push_group(channel & mask, width);
        }

        let decoded = packer.bytes();
        if decoded.len() - searched_to >= scan_chunk_bytes {
            if let Some(pos) = find_marker(decoded, searched_to) {
                debug!("Marker found early at byte {}", pos);
                return finish_extraction(decoded[..pos].to_vec(), true);
            }
            searched_to = decoded.len();
        }
    }

    let decoded = packer.finish();
    match find_marker(&decoded, searched_to) {
        Some(pos) => finish_extraction(decoded[..pos].to_vec(), true),
        None => {
            warn!(
                "No termination marker in {} decoded bytes; returning the whole stream",
                decoded.len()
            );
            finish_extraction(decoded, false)
        }
    }
}

fn finish_extraction(candidate: Vec<u8>, marker_found: bool) -> Extraction {
    let unpacked = compression::decompress(&candidate);
    Extraction {
        data: unpacked.bytes,
        marker_found,
        decompressed: unpacked.transformed,
    }
}

/// First occurrence of the termination marker in `data`.
///
/// Bytes before `searched_to` are known to be marker free, so the search only
/// rescans the last five of them to catch a marker straddling the
/// boundary.
fn find_marker(data: &[u8], searched_to: usize) -> Option<usize> {
    let start = searched_to.saturating_sub(TERMINATION_MARKER.len() - 1);
    data.get(start..)?
        .windows(TERMINATION_MARKER.len())
        .position(|window| window == TERMINATION_MARKER)
        .map(|offset| start + offset)
}
