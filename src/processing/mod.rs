//! # Image Processing and Steganography
//!
//! Hides text messages and files in the least significant bits of RGB images.
//!
//! - [`payload`]: tagged frame format (`TXT:` / `FILE:`) and its parser
//! - [`codec`]: capacity math and the LSB embed/extract walk
//! - [`bits`]: MSB-first bit stream helpers used by the codec
//! - [`compression`]: whole-frame zlib with raw fallback
//! - [`grid`]: the decoded RGB pixel raster
//! - [`image_io`]: reading covers and writing PNG output
//! - [`steganography`]: the end-to-end encode/decode pipeline

pub mod bits;
pub mod codec;
pub mod compression;
pub mod grid;
pub mod image_io;
pub mod payload;
pub mod steganography;

// Re-export main types for convenience
pub use codec::{capacity, embed, extract, BitsPerChannel, CapacityReport, TERMINATION_MARKER};
pub use grid::PixelGrid;
pub use payload::PayloadFrame;
pub use steganography::{hide, reveal, reveal_auto};
