//! # Cicada Steganography
//!
//! Hides a short text message or an arbitrary file in the least significant
//! bits of an RGB image and recovers it byte for byte.
//!
//! ```ignore
//! use cicada_stego::processing::{hide, reveal, image_io, PayloadFrame};
//! use cicada_stego::common::config::StegoConfig;
//!
//! let config = StegoConfig::default();
//! let cover = image_io::load_grid("cover.png")?;
//! let stego = hide(&cover, &PayloadFrame::text("secret")?, &config)?;
//! image_io::save_png(&stego, "out.png")?;
//!
//! let frame = reveal(&image_io::load_grid("out.png")?, config.bits_per_channel()?)?;
//! ```

pub mod common;
pub mod error;
pub mod processing;
pub mod server;
pub mod utils;

pub use error::StegoError;
pub use processing::{BitsPerChannel, PayloadFrame, PixelGrid};
