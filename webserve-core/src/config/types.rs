//! Configuration type definitions
//!
//! A `ServerConfig` is built once at startup and never changes afterwards.

use std::path::PathBuf;
use std::time::Duration;

use super::ResponseHeaderSet;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default delay before the browser is opened
pub const DEFAULT_OPEN_DELAY: Duration = Duration::from_secs(2);

/// Static asset server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on (all interfaces)
    pub port: u16,

    /// Absolute path of the directory holding the static assets
    pub root: PathBuf,

    /// Skip per-request log lines
    pub suppress_access_logs: bool,

    /// Open the default browser once the server is up
    pub auto_open_browser: bool,

    /// Delay before the browser is opened
    pub browser_open_delay: Duration,

    /// Headers set on every response
    pub headers: ResponseHeaderSet,

    /// Index documents tried for directory requests, in order
    pub index: Vec<String>,

    /// List directories that have no index document
    pub browse: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
            suppress_access_logs: true,
            auto_open_browser: true,
            browser_open_delay: DEFAULT_OPEN_DELAY,
            headers: ResponseHeaderSet::default(),
            index: vec!["index.html".to_string(), "index.htm".to_string()],
            browse: true,
        }
    }
}

impl ServerConfig {
    /// Create a configuration serving `root` with default settings
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_access_logs(mut self, enable: bool) -> Self {
        self.suppress_access_logs = !enable;
        self
    }

    pub fn with_browser(mut self, enable: bool, delay: Duration) -> Self {
        self.auto_open_browser = enable;
        self.browser_open_delay = delay;
        self
    }

    pub fn with_headers(mut self, headers: ResponseHeaderSet) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_browse(mut self, enable: bool) -> Self {
        self.browse = enable;
        self
    }

    /// URL the operator opens for a bound port
    pub fn url_for_port(port: u16) -> String {
        format!("http://localhost:{}", port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.suppress_access_logs);
        assert!(config.auto_open_browser);
        assert_eq!(config.browser_open_delay, Duration::from_secs(2));
        assert_eq!(config.index, vec!["index.html", "index.htm"]);
        assert_eq!(config.headers.iter().count(), 5);
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::new("/srv/web")
            .with_port(9000)
            .with_access_logs(true)
            .with_browser(false, Duration::from_millis(10))
            .with_browse(false);

        assert_eq!(config.root, PathBuf::from("/srv/web"));
        assert_eq!(config.port, 9000);
        assert!(!config.suppress_access_logs);
        assert!(!config.auto_open_browser);
        assert!(!config.browse);
        assert_eq!(ServerConfig::url_for_port(config.port), "http://localhost:9000");
    }
}
