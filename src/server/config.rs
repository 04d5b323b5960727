use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::path::Path;

use crate::common::config::{load_config, StegoConfig};

/// Complete web server configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerInfo,
    #[serde(default)]
    pub stego: StegoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// Listen address, e.g. "127.0.0.1:3000"
    pub address: String,
    /// Upper bound on a multipart request body
    pub max_upload_bytes: usize,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            address = "0.0.0.0:8080"

            [stego]
            bits_per_channel = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert_eq!(config.server.max_upload_bytes, 64 * 1024 * 1024);
        assert_eq!(config.stego.bits_per_channel, 1);
        assert!(config.stego.compress);
    }
}
