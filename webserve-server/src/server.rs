//! Static asset HTTP server

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE};
use http::{HeaderMap, HeaderName, Method, Request, Response, StatusCode};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use webserve_core::config::validate_root;
use webserve_core::{Error, Result, ServerConfig};
use webserve_static::{FileServer, FileServerConfig, Preconditions};

use crate::browser::{schedule_open, BrowserLauncher};
use crate::response::{self, Body};

/// How long in-flight connections get to finish after shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Read-only state shared by every connection
struct ServerState {
    config: ServerConfig,
    files: FileServer,
}

/// A server whose root is validated and whose listener is bound
pub struct StaticServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<ServerState>,
}

impl StaticServer {
    /// Validate the root directory, then bind `0.0.0.0:<port>`
    ///
    /// Nothing is bound when the root is missing.
    pub async fn bind(mut config: ServerConfig) -> Result<Self> {
        config.root = validate_root(&config.root)?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| bind_error(addr, e))?;
        let local_addr = listener.local_addr()?;

        tracing::info!("🌐 Listening on {}", local_addr);
        tracing::info!("📁 Serving from: {}", config.root.display());

        let files = FileServer::new(FileServerConfig::from(&config));
        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(ServerState { config, files }),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://localhost:<bound port>`
    pub fn url(&self) -> String {
        ServerConfig::url_for_port(self.local_addr.port())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Schedule the browser open if configured, then serve until `shutdown` resolves
    pub async fn run<F>(self, launcher: Arc<dyn BrowserLauncher>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let config = &self.state.config;
        if config.auto_open_browser {
            tracing::info!("🌐 Opening browser in {:?}...", config.browser_open_delay);
            // Fire-and-forget: the handle is dropped, the task outlives it.
            drop(schedule_open(launcher, self.url(), config.browser_open_delay));
        }

        self.serve(shutdown).await
    }

    /// Serve connections until `shutdown` resolves or accepting fails
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self { listener, state, .. } = self;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => break Ok(()),
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) if is_per_connection(&e) => {
                            tracing::debug!("Accept error on a single connection: {}", e);
                            continue;
                        }
                        Err(e) => break Err(Error::Server(format!("Failed to accept connection: {}", e))),
                    };
                    connections.spawn(serve_connection(stream, peer, state.clone(), shutdown_rx.clone()));
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        };

        drop(listener);
        tracing::info!("🛑 Stopped accepting connections");

        let _ = shutdown_tx.send(true);
        let drain = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            tracing::warn!("⚠️ Aborting {} connection(s) still open", connections.len());
            connections.shutdown().await;
        }

        result
    }
}

fn bind_error(addr: SocketAddr, source: std::io::Error) -> Error {
    if source.kind() == std::io::ErrorKind::AddrInUse {
        Error::PortInUse { port: addr.port() }
    } else {
        Error::Bind { addr, source }
    }
}

/// Accept errors that concern one client rather than the listener
fn is_per_connection(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::Interrupted
    )
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| handle_request(req, state.clone(), peer));
    let conn = http1::Builder::new().serve_connection(io, service);
    let mut conn = std::pin::pin!(conn);
    let mut draining = false;

    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(err) = res {
                    tracing::debug!("Error serving connection from {}: {:?}", peer, err);
                }
                break;
            }
            _ = shutdown.changed(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

async fn handle_request<B>(
    req: Request<B>,
    state: Arc<ServerState>,
    peer: SocketAddr,
) -> std::result::Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let path = parts.uri.path();

    let mut response = match parts.method {
        Method::GET | Method::HEAD => {
            let pre = preconditions(&parts.headers);
            match state.files.serve(path, parts.uri.query(), pre).await {
                Ok(served) => response::from_served(served),
                Err(e) => {
                    tracing::error!("❌ Failed to serve {}: {}", path, e);
                    response::error_page(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        _ => response::not_implemented(),
    };

    state.config.headers.apply(response.headers_mut());

    if let Some(line) = access_line(&state.config, peer, &parts.method, path, response.status(), started) {
        tracing::info!(target: "webserve::access", "{}", line);
    }

    Ok(response)
}

fn preconditions(headers: &HeaderMap) -> Preconditions<'_> {
    let get = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
    Preconditions {
        if_none_match: get(IF_NONE_MATCH),
        if_modified_since: get(IF_MODIFIED_SINCE),
        range: get(RANGE),
    }
}

/// Per-request log line, `None` when access logs are suppressed
fn access_line(
    config: &ServerConfig,
    peer: SocketAddr,
    method: &Method,
    path: &str,
    status: StatusCode,
    started: Instant,
) -> Option<String> {
    if config.suppress_access_logs {
        return None;
    }
    Some(format!(
        "{} \"{} {}\" {} {:?}",
        peer,
        method,
        path,
        status.as_u16(),
        started.elapsed()
    ))
}
