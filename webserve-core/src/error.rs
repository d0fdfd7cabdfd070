//! Error types for Webserve

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::BUILD_COMMAND;

/// Result type for Webserve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Webserve
#[derive(Error, Debug)]
pub enum Error {
    /// The static asset directory does not exist
    #[error("Web build not found at {}", .0.display())]
    MissingRootDirectory(PathBuf),

    /// The static asset directory exists but cannot be listed
    #[error("Web build at {} is not a readable directory: {source}", path.display())]
    UnreadableRootDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the configured port
    #[error("Port {port} is already in use")]
    PortInUse { port: u16 },

    /// Any other failure binding the listener
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Fatal error while serving
    #[error("Server error: {0}")]
    Server(String),

    /// The default browser could not be opened
    #[error("Could not open browser at {url}: {reason}")]
    BrowserLaunch { url: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Operator-facing hint for errors that have an obvious fix
    pub fn remediation(&self) -> Option<String> {
        match self {
            Error::MissingRootDirectory(_) | Error::UnreadableRootDirectory { .. } => {
                Some(format!("Please run: {}", BUILD_COMMAND))
            }
            Error::PortInUse { .. } => Some(
                "Please close other applications using this port or pick another one with --port."
                    .to_string(),
            ),
            Error::BrowserLaunch { url, .. } => {
                Some(format!("Please open your browser and go to: {}", url))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_names_path_and_build_command() {
        let err = Error::MissingRootDirectory(PathBuf::from("/srv/app/build/web"));
        assert!(err.to_string().contains("/srv/app/build/web"));
        assert_eq!(err.remediation().unwrap(), "Please run: flutter build web");
    }

    #[test]
    fn test_port_in_use_message() {
        let err = Error::PortInUse { port: 8080 };
        assert_eq!(err.to_string(), "Port 8080 is already in use");
        assert!(err.remediation().unwrap().contains("--port"));
    }

    #[test]
    fn test_browser_failure_names_url() {
        let err = Error::BrowserLaunch {
            url: "http://localhost:8080".to_string(),
            reason: "no display".to_string(),
        };
        assert!(err.to_string().contains("http://localhost:8080"));
        assert!(err.remediation().unwrap().contains("http://localhost:8080"));
    }

    #[test]
    fn test_bind_error_has_no_hint() {
        let err = Error::Bind {
            addr: "0.0.0.0:80".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.remediation().is_none());
        assert!(err.to_string().starts_with("Failed to bind 0.0.0.0:80"));
    }
}
