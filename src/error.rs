//! # Error Types
//!
//! Errors that can escape the steganography codec. Everything recoverable
//! (compression failure, invalid UTF-8, a missing termination marker) is
//! resolved locally and never shows up here.

use thiserror::Error;

/// Errors produced by the payload framer and the bit codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// The payload (marker included) does not fit in the cover image.
    #[error("Data too large ({required} bytes) for this image (max {max} bytes). Try using a larger image.")]
    CapacityExceeded { required: usize, max: usize },

    /// A framing request that cannot be honoured (empty message, oversized extension, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A tagged frame whose declared lengths do not fit the available bytes.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Bits per channel must be between 1 and 8.
    #[error("invalid bits per channel: {0} (expected 1..=8)")]
    InvalidBitsPerChannel(u8),

    /// Pixel buffer length does not match the declared dimensions.
    #[error("pixel grid holds {actual} pixels but dimensions require {expected}")]
    InvalidGrid { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, StegoError>;
