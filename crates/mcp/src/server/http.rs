//! Streamable HTTP host for the MCP handler.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use coze_mcp_api::CozeWorkflowClient;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::server::core::CozeMcpCore;

/// Path the MCP service is mounted under.
const MCP_PATH: &str = "/mcp";

/// Host configuration for the MCP HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServer {
    bind_address: SocketAddr,
    workflow_client: Arc<CozeWorkflowClient>,
}

impl McpHttpServer {
    pub fn new(bind_address: SocketAddr, workflow_client: Arc<CozeWorkflowClient>) -> Self {
        Self {
            bind_address,
            workflow_client,
        }
    }

    /// Bind the listener and start serving in the background.
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let cancellation_token = CancellationToken::new();
        let session_manager = Arc::new(LocalSessionManager::default());
        let client_counter = Arc::new(AtomicUsize::new(0));
        let monitor_handle = spawn_session_monitor(
            Arc::clone(&session_manager),
            Arc::clone(&client_counter),
            cancellation_token.child_token(),
        );

        let workflow_client = Arc::clone(&self.workflow_client);
        let service: StreamableHttpService<CozeMcpCore, LocalSessionManager> = StreamableHttpService::new(
            move || Ok(CozeMcpCore::new(Arc::clone(&workflow_client))),
            Arc::clone(&session_manager),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                cancellation_token: cancellation_token.child_token(),
                ..Default::default()
            },
        );

        let router = Router::new().nest_service(MCP_PATH, service);
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("bind MCP HTTP listener on {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        info!(address = %bound_address, path = MCP_PATH, "MCP HTTP server listening");

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                if let Err(error) = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await
                {
                    warn!(%error, "MCP HTTP server exited with an error");
                }
            }
        });

        Ok(RunningMcpHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
            monitor_handle,
            client_counter,
        })
    }
}

/// Runtime handle for a running MCP HTTP server.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
    monitor_handle: JoinHandle<()>,
    client_counter: Arc<AtomicUsize>,
}

impl RunningMcpHttpServer {
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Full URL MCP clients should connect to.
    pub fn endpoint(&self) -> String {
        format!("http://{}{MCP_PATH}", self.bind_address)
    }

    /// Return the most recently observed session count.
    pub fn connected_clients(&self) -> usize {
        self.client_counter.load(Ordering::Relaxed)
    }

    /// Stop the server and wait for background tasks to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.monitor_handle
            .await
            .map_err(|error| anyhow!("MCP HTTP monitor task failed: {error}"))?;
        self.server_handle
            .await
            .map_err(|error| anyhow!("MCP HTTP server task failed: {error}"))?;
        info!("MCP HTTP server stopped");
        Ok(())
    }
}

/// Resolve the listening address from a host name or IP and a port.
///
/// `localhost` maps to the IPv4 loopback. Non-loopback addresses are allowed
/// but logged, since the server has no authentication of its own.
pub fn resolve_bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    let host = host.trim();
    let ip = if host.eq_ignore_ascii_case("localhost") {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    } else {
        host.trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map_err(|error| anyhow!("invalid MCP HTTP bind host '{host}': {error}"))?
    };
    if !ip.is_loopback() {
        warn!(%ip, "MCP HTTP server is binding to a non-loopback address");
    }
    Ok(SocketAddr::new(ip, port))
}

fn spawn_session_monitor(
    session_manager: Arc<LocalSessionManager>,
    client_counter: Arc<AtomicUsize>,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    let count = session_manager.sessions.read().await.len();
                    client_counter.store(count, Ordering::Relaxed);
                }
            }
        }
    })
}
