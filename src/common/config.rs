//! # Configuration Utilities
//!
//! Shared configuration structures and parsing utilities used by the CLI and
//! the web server.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::StegoError;
use crate::processing::codec::BitsPerChannel;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: ServerConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Codec settings shared by encoder and decoder.
///
/// `bits_per_channel` is not stored in the image, so both sides must be
/// configured with the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Low-order bits per color channel carrying data (1..=8)
    pub bits_per_channel: u8,
    /// Compress the frame with zlib before embedding
    pub compress: bool,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            bits_per_channel: BitsPerChannel::default().get(),
            compress: true,
        }
    }
}

impl StegoConfig {
    /// The validated bits-per-channel setting.
    pub fn bits_per_channel(&self) -> Result<BitsPerChannel, StegoError> {
        BitsPerChannel::new(self.bits_per_channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_missing_fields() {
        let config: StegoConfig = toml::from_str("compress = false").unwrap();
        assert_eq!(config.bits_per_channel, 2);
        assert!(!config.compress);

        let config: StegoConfig = toml::from_str("").unwrap();
        assert_eq!(config, StegoConfig::default());
    }

    #[test]
    fn test_bits_per_channel_is_validated() {
        let config: StegoConfig = toml::from_str("bits_per_channel = 12").unwrap();
        assert_eq!(
            config.bits_per_channel(),
            Err(StegoError::InvalidBitsPerChannel(12))
        );
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stego.toml");
        fs::write(&path, "bits_per_channel = 1\ncompress = true\n").unwrap();

        let config: StegoConfig = load_config(&path).unwrap();
        assert_eq!(config.bits_per_channel().unwrap(), BitsPerChannel::ONE);
    }
}
