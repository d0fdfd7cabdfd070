//! Webserve Core Library
//!
//! Configuration, response header policy and the error taxonomy shared by
//! the file server, the HTTP serving loop and the CLI.

pub mod config;
pub mod error;

pub use config::{ResponseHeaderSet, ServerConfig};
pub use error::{Error, Result};

/// Webserve version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
