//! Webserve HTTP Server
//!
//! Binds the listener, serves the root directory over HTTP/1.1 with the
//! configured response headers, opens the browser once and stops on signal.

pub mod browser;
mod response;
pub mod server;
mod shutdown;

pub use browser::{schedule_open, BrowserLauncher, SystemBrowser};
pub use server::StaticServer;
pub use shutdown::shutdown_signal;
