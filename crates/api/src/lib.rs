//! Coze workflow API client.
//!
//! This crate holds the two pieces that talk to the Coze platform:
//!
//! - [`CozeConfig`]: connection settings resolved from defaults, a `.env`
//!   file, the process environment and command-line overrides
//! - [`CozeWorkflowClient`]: a pooled HTTP client that runs one workflow per
//!   call and folds every outcome into a [`WorkflowRunResponse`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use coze_mcp_api::{CozeConfig, CozeWorkflowClient};
//! use coze_mcp_types::WorkflowRunRequest;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let config = Arc::new(CozeConfig::from_env()?);
//!     let client = CozeWorkflowClient::new(config)?;
//!     let response = client.run_workflow(&WorkflowRunRequest::new("7531773147675099136")).await;
//!     println!("{}: {}", response.code, response.msg);
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! [`WorkflowRunResponse`]: coze_mcp_types::WorkflowRunResponse

mod client;
mod config;
mod error;

pub use client::{CozeWorkflowClient, REQUEST_TIMEOUT};
pub use config::{
    BASE_URL_ENV, ConfigError, ConfigOverrides, CozeConfig, DEFAULT_BASE_URL, DEFAULT_MCP_PORT, MCP_PORT_ENV, TOKEN_ENV,
    WORKFLOW_RUN_PATH, load_env_file, load_env_path,
};
pub use error::WorkflowCallError;
