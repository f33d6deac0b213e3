//! HTTP server for Prometheus metrics export
//!
//! Exposes the collector registry at the metrics path for Prometheus
//! scraping. Every request to the metrics path runs a full collection cycle
//! (one provider fetch per symbol); there is no caching between scrapes.

use anyhow::{Context, Result};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{CollectorRegistry, ScrapeContext};
use crate::config::ServerConfig;
use crate::core::ExporterError;

const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Configuration for metrics HTTP server
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub listen_addr: SocketAddr,
    /// Path to serve metrics (default: "/metrics")
    pub metrics_path: String,
    /// Upper bound on one collection cycle
    pub scrape_timeout: Duration,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            metrics_path: "/metrics".to_string(),
            scrape_timeout: Duration::from_secs(15),
        }
    }
}

impl TryFrom<&ServerConfig> for MetricsServerConfig {
    type Error = anyhow::Error;

    fn try_from(config: &ServerConfig) -> Result<Self> {
        let listen_addr = parse_listen_addr(&config.listen_addr)?;

        Ok(Self {
            listen_addr,
            metrics_path: config.metrics_path.clone(),
            scrape_timeout: Duration::from_secs(config.scrape_timeout_secs),
        })
    }
}

/// Parse a listen address, treating a bare `:port` as `0.0.0.0:port`
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    };
    full.parse::<SocketAddr>()
        .with_context(|| format!("Invalid listen address '{}'", addr))
}

/// Per-connection state shared by the request handler
struct Shared {
    registry: Arc<CollectorRegistry>,
    metrics_path: String,
    scrape_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

/// HTTP server for Prometheus metrics
pub struct MetricsServer {
    config: MetricsServerConfig,
    registry: Arc<CollectorRegistry>,
}

impl MetricsServer {
    /// Create a new metrics server
    pub fn new(config: MetricsServerConfig, registry: Arc<CollectorRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &MetricsServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until `shutdown` flips to `true`
    pub async fn serve(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(ExporterError::Io)
            .with_context(|| format!("Failed to bind metrics server on {}", self.config.listen_addr))?;

        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener
    ///
    /// In-flight scrapes observe the same shutdown signal, so their provider
    /// fetches are cancelled (and counted as failures) when the process stops.
    pub async fn serve_on(self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let local_addr = listener.local_addr().context("Failed to read local address")?;
        info!(
            "Metrics server listening on http://{}{}",
            local_addr, self.config.metrics_path
        );

        let shared = Arc::new(Shared {
            registry: self.registry.clone(),
            metrics_path: self.config.metrics_path.clone(),
            scrape_timeout: self.config.scrape_timeout,
            shutdown: shutdown.clone(),
        });

        loop {
            let (stream, remote_addr) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
                _ = shutdown.wait_for(|stop| *stop) => {
                    info!("Metrics server shutting down");
                    break;
                }
            };

            let shared = shared.clone();

            // Spawn a new task for each connection
            tokio::spawn(async move {
                let io = TokioIo::new(stream);

                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let shared = shared.clone();
                    async move { handle_request(req, &shared).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection error from {}: {}", remote_addr, err);
                }
            });
        }

        Ok(())
    }
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(body.into()));
    *resp.status_mut() = status;
    resp
}

/// Handle HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    shared: &Shared,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path();

    debug!("Metrics request: {} {}", req.method(), path);

    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Ok(text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }

    // Health check endpoint
    if path == "/health" || path == "/healthz" {
        return Ok(text_response(StatusCode::OK, "OK"));
    }

    // Metrics endpoint
    if path == shared.metrics_path {
        let ctx = ScrapeContext::background()
            .with_timeout(shared.scrape_timeout)
            .with_shutdown(shared.shutdown.clone());

        return match shared.registry.encode_text(&ctx).await {
            Ok(metrics_text) => {
                let mut resp = text_response(StatusCode::OK, metrics_text);
                resp.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
                Ok(resp)
            }
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                Ok(text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error: {}", e),
                ))
            }
        };
    }

    // Root endpoint - simple help page
    if path == "/" {
        let mut help_text = format!(
            "Option Chain Exporter\n\nEndpoints:\n  {} - Prometheus metrics\n  /health - Health check\n\nMetrics:\n",
            shared.metrics_path
        );
        for name in shared.registry.metric_names() {
            help_text.push_str("  ");
            help_text.push_str(&name);
            help_text.push('\n');
        }
        return Ok(text_response(StatusCode::OK, help_text));
    }

    // 404 for unknown paths
    warn!("Unknown metrics endpoint requested: {}", path);
    Ok(text_response(StatusCode::NOT_FOUND, "Not Found"))
}
