//! # Stego Service
//!
//! [`StegoCore`] wraps the steganography pipeline for use from async code
//! (the web server); [`ServerConfig`] holds its listen and codec settings.

pub mod config;
pub mod server;

pub use config::ServerConfig;
pub use server::StegoCore;
