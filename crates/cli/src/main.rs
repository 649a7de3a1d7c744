use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use coze_mcp_api::{ConfigOverrides, CozeConfig, CozeWorkflowClient, DEFAULT_MCP_PORT, load_env_file};
use coze_mcp_server::{McpHttpServer, resolve_bind_address, serve_stdio};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Expose Coze workflows as Model Context Protocol tools.
#[derive(Debug, Parser)]
#[command(name = "coze-mcp", version, about)]
struct Cli {
    /// Transport used to talk to the MCP client.
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    transport: Transport,

    /// Host or IP to listen on (http transport).
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (http transport). Overrides MCP_PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Coze API base URL. Overrides COZE_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Coze personal access token. Overrides COZE_API_TOKEN.
    #[arg(long)]
    token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Http,
    Stdio,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        // Nothing binds a port over stdio, so MCP_PORT is not consulted there.
        let mcp_port = match self.transport {
            Transport::Http => self.port,
            Transport::Stdio => self.port.or(Some(DEFAULT_MCP_PORT)),
        };
        ConfigOverrides {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            mcp_port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_file = load_env_file();
    init_tracing();
    match env_file {
        Ok(Some(path)) => info!(path = %path.display(), "loaded environment file"),
        Ok(None) => {}
        Err(error) => warn!(%error, "environment file was not fully loaded; entries from the failing line on are missing"),
    }

    let config = Arc::new(CozeConfig::from_env_with_overrides(cli.overrides())?);
    if config.token().is_empty() {
        warn!("no Coze API token configured; set COZE_API_TOKEN or pass --token");
    }
    info!(?config, api_url = %config.api_url(), "starting Coze workflow MCP server");

    let workflow_client = Arc::new(CozeWorkflowClient::new(Arc::clone(&config))?);
    let result = match cli.transport {
        Transport::Http => serve_http(&cli.host, config.mcp_port(), Arc::clone(&workflow_client)).await,
        Transport::Stdio => serve_stdio(Arc::clone(&workflow_client), shutdown_signal()).await,
    };

    workflow_client.close();
    result
}

async fn serve_http(host: &str, port: u16, workflow_client: Arc<CozeWorkflowClient>) -> Result<()> {
    let bind_address = resolve_bind_address(host, port)?;
    let running = McpHttpServer::new(bind_address, workflow_client)
        .start()
        .await
        .context("start MCP HTTP server")?;
    info!(endpoint = %running.endpoint(), "MCP endpoint ready");

    shutdown_signal().await;
    info!(connected_clients = running.connected_clients(), "shutting down");
    running.stop().await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
