//! Webserve Static File Module
//!
//! Maps request paths onto files under the root directory with:
//! - MIME type detection
//! - Index document handling and directory listings
//! - Trailing-slash redirects for directories
//! - Conditional (`If-None-Match`, `If-Modified-Since`) and range requests

mod file_server;
mod listing;
mod mime;

pub use file_server::{FileServer, FileServerConfig, Preconditions, Served, ServedFile};
