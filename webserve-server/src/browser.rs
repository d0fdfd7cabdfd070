//! Deferred browser launch

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use webserve_core::{Error, Result};

/// Opens a URL in a browser
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self, url: &str) -> Result<()>;
}

/// The operating system's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

#[async_trait]
impl BrowserLauncher for SystemBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        let target = url.to_string();
        let reason = match tokio::task::spawn_blocking(move || webbrowser::open(&target)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("launcher task failed: {}", e),
        };
        Err(Error::BrowserLaunch {
            url: url.to_string(),
            reason,
        })
    }
}

/// Open `url` once after `delay` on a separate task
///
/// Failures are logged here and never reach the server. The handle may be
/// dropped; the task keeps running.
pub fn schedule_open(
    launcher: Arc<dyn BrowserLauncher>,
    url: String,
    delay: Duration,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let result = launcher.open(&url).await;
        match &result {
            Ok(()) => tracing::info!("✅ Browser opened at {}", url),
            Err(e) => {
                tracing::warn!("⚠️ Could not open browser automatically: {}", e);
                if let Some(hint) = e.remediation() {
                    tracing::warn!("   💡 {}", hint);
                }
            }
        }
        result
    })
}
