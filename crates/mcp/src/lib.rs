//! Model Context Protocol (MCP) server for Coze workflows.
//!
//! This crate exposes a shared [`coze_mcp_api::CozeWorkflowClient`] to MCP
//! clients as tools, a resource template and a prompt, and hosts the handler
//! over streamable HTTP or stdio.

pub mod server;

pub use server::{CozeMcpCore, McpHttpServer, RunningMcpHttpServer, resolve_bind_address, serve_io, serve_stdio};
