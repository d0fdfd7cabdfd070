//! Webserve - serve a pre-built web app bundle locally
//!
//! This is the main entry point for the webserve CLI.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webserve_core::config::{resolve_root, DEFAULT_OPEN_DELAY, DEFAULT_PORT};
use webserve_core::{Error, ResponseHeaderSet, ServerConfig};
use webserve_server::{shutdown_signal, StaticServer, SystemBrowser};

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Webserve - local static server for a pre-built web app
#[derive(Parser, Debug)]
#[command(name = "webserve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on (all interfaces)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory to serve [default: build/web next to the executable]
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Do not open the browser
    #[arg(long)]
    no_browser: bool,

    /// Seconds to wait before opening the browser
    #[arg(long, default_value_t = DEFAULT_OPEN_DELAY.as_secs())]
    open_delay: u64,

    /// Log every request
    #[arg(long)]
    access_log: bool,

    /// Omit the Cache-Control / Pragma / Expires headers
    #[arg(long)]
    allow_cache: bool,

    /// Answer 404 for directories without an index document
    #[arg(long)]
    no_listing: bool,

    /// Wait for Enter before exiting on errors
    #[arg(long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn server_config(&self) -> webserve_core::Result<ServerConfig> {
        let root = resolve_root(self.root.as_deref())?;
        let headers = if self.allow_cache {
            ResponseHeaderSet::cross_origin_isolation()
        } else {
            ResponseHeaderSet::default()
        };

        Ok(ServerConfig::new(root)
            .with_port(self.port)
            .with_access_logs(self.access_log)
            .with_browser(!self.no_browser, Duration::from_secs(self.open_delay))
            .with_headers(headers)
            .with_browse(!self.no_listing))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new().context("Failed to start the async runtime") {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Unexpected error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(&cli));
    // A browser launch may still sit on the blocking pool.
    runtime.shutdown_timeout(Duration::from_millis(500));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            if cli.interactive {
                pause();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if verbose {
        tracing::info!("Verbose mode enabled");
    }
}

async fn run(cli: &Cli) -> webserve_core::Result<()> {
    println!("🚀 Webserve v{} starting...", webserve_core::VERSION);
    println!("{}", "=".repeat(50));

    let config = cli.server_config()?;
    let server = StaticServer::bind(config).await?;
    let url = server.url();

    println!("✅ Server started successfully!");
    println!("📱 Your app is running at: {}", url);
    println!("📁 Serving from: {}", server.config().root.display());
    if server.config().auto_open_browser {
        println!("\n🌐 Opening browser automatically...");
    }
    println!("⏹️  Press Ctrl+C to stop the server");
    println!("{}", "=".repeat(50));

    server.run(Arc::new(SystemBrowser), shutdown_signal()).await?;

    println!("\n\n🛑 Server stopped by user");
    Ok(())
}

fn report(err: &Error) {
    eprintln!("❌ Error: {}", err);
    if let Some(hint) = err.remediation() {
        eprintln!("{}", hint);
    }
}

fn pause() {
    println!("\nPress Enter to exit...");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
