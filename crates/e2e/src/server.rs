//! Live server management - starting and health checking the to-do app

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use todolist_web::{ListStore, WebServer, WebServerConfig};

use crate::error::{E2eError, E2eResult};

/// Handle to a running live server
pub struct ServerHandle {
    pub base_url: String,
    pub port: u16,
    store: Option<Arc<ListStore>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHandle {
    /// Start the live server, or attach to an external one, and wait until healthy
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let handle = match &config.external_url {
            Some(url) => {
                info!("Using external server at {}", url);
                Self::external(url)?
            }
            None => Self::start_in_process(&config).await?,
        };

        // External servers are not guaranteed to expose /health
        let health_path = if config.external_url.is_some() { "/" } else { "/health" };
        handle
            .wait_for_healthy(health_path, config.startup_timeout)
            .await?;

        info!("Server is healthy at {}", handle.base_url);
        Ok(handle)
    }

    fn external(url: &str) -> E2eResult<Self> {
        let base_url = url.trim_end_matches('/').to_string();
        let port = reqwest::Url::parse(&base_url)
            .map_err(|e| E2eError::ServerStartup(format!("Invalid server URL {}: {}", url, e)))?
            .port_or_known_default()
            .unwrap_or(80);

        Ok(Self {
            base_url,
            port,
            store: None,
            shutdown: None,
            task: None,
        })
    }

    async fn start_in_process(config: &ServerConfig) -> E2eResult<Self> {
        let listener = TcpListener::bind(("127.0.0.1", config.port.unwrap_or(0)))
            .await
            .map_err(|e| E2eError::ServerStartup(format!("Failed to bind: {}", e)))?;
        let port = listener.local_addr()?.port();
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Starting live server on port {}", port);

        let server = WebServer::new(config.web.clone());
        let store = server.store();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(server.serve_listener(listener, async move {
            let _ = shutdown_rx.await;
        }));

        Ok(Self {
            base_url,
            port,
            store: Some(store),
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Wait for the server to respond to health checks
    async fn wait_for_healthy(&self, path: &str, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}{}", self.base_url, path);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .no_proxy()
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for server to start...");
                    }
                    // Connection refused is expected while the server is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Storage of the in-process server; `None` for an external server
    pub fn store(&self) -> Option<&Arc<ListStore>> {
        self.store.as_ref()
    }

    /// Stop the server
    pub async fn stop(&mut self) -> E2eResult<()> {
        if let Some(tx) = self.shutdown.take() {
            info!("Stopping live server on port {}", self.port);
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(e) => warn!("Live server task failed: {}", e),
            }
        }
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Configuration for the live server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Target an already running server instead of starting one
    pub external_url: Option<String>,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for server startup
    pub startup_timeout: Duration,

    /// Configuration of the in-process app
    pub web: WebServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            external_url: None,
            port: None,
            startup_timeout: Duration::from_secs(30),
            web: WebServerConfig::default(),
        }
    }
}
