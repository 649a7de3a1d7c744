mod core;
mod errors;
mod http;
mod prompts;
mod resources;
mod schemas;
mod stdio;
mod tools;

pub use core::CozeMcpCore;
pub use http::{McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
pub use schemas::{RunWorkflowParam, WorkflowStatusParam};
pub use stdio::{serve_io, serve_stdio};
