//! Server configuration

mod headers;
mod root;
mod types;

pub use headers::ResponseHeaderSet;
pub use root::{default_root, resolve_root, validate_root, BUILD_COMMAND, DEFAULT_BUNDLE_DIR};
pub use types::{ServerConfig, DEFAULT_OPEN_DELAY, DEFAULT_PORT};
