//! Shared value types for the Coze workflow MCP adapter.
//!
//! The workflow client, the MCP tool layer and the tests all speak in terms of
//! these types, so they live in their own crate with no I/O dependencies.

pub mod workflow;

pub use workflow::{
    FAILURE_CODE, MISSING_MESSAGE, WorkflowRunRequest, WorkflowRunResponse, WorkflowStatusPlaceholder, WorkflowToolFailure,
    WorkflowToolOutput,
};
