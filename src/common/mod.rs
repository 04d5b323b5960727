//! # Common Components
//!
//! Shared utilities used by both the CLI and the web server.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing utilities and codec settings

pub mod config;
