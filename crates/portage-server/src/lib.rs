//! # Portage Server
//!
//! HTTP surface for the conversion pipeline.
//!
//! This crate provides:
//! - Fire-and-forget conversion start endpoint
//! - Non-blocking conversion status polling
//! - Advisory stop requests
//!
//! Project upload, archive handling, and result download belong to the
//! surrounding application, not this crate.

#![warn(clippy::all)]

pub mod server;

pub use server::{ConvertServer, ConvertServerConfig};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

impl Default for ConvertServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            enable_cors: true,
        }
    }
}
