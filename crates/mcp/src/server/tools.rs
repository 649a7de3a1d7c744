//! Tool bodies, kept apart from the rmcp router so they can be driven directly.
//!
//! Both tools answer with a pretty-printed JSON document as text content.
//! Workflow failures are part of that document; they are never raised as MCP
//! errors.

use coze_mcp_api::CozeWorkflowClient;
use coze_mcp_types::{WorkflowRunRequest, WorkflowStatusPlaceholder, WorkflowToolFailure};
use serde::Serialize;
use tracing::warn;

use crate::server::schemas::{RunWorkflowParam, WorkflowStatusParam};

/// Last-resort body when even the failure document cannot be encoded.
const UNRENDERABLE_FAILURE: &str = "{\n  \"code\": -1,\n  \"msg\": \"execution failed: response could not be encoded\",\n  \"data\": null\n}";

/// Run a workflow and render the tool output.
pub async fn run_workflow(client: &CozeWorkflowClient, param: RunWorkflowParam) -> String {
    let request = match build_request(param) {
        Ok(request) => request,
        Err(message) => return render_failure(&message),
    };
    let response = client.run_workflow(&request).await;
    render(&response.to_tool_output())
}

pub fn workflow_status(param: &WorkflowStatusParam) -> String {
    render(&WorkflowStatusPlaceholder::pending(param.execute_id.clone()))
}

fn build_request(param: RunWorkflowParam) -> Result<WorkflowRunRequest, String> {
    if param.workflow_id.trim().is_empty() {
        return Err("workflow_id must not be empty".to_string());
    }

    let mut request = WorkflowRunRequest::new(param.workflow_id).with_async(param.is_async);
    if let Some(parameters) = param.parameters {
        request = request.with_parameters(parameters);
    }
    if let Some(bot_id) = param.bot_id {
        request = request.with_bot_id(bot_id);
    }
    if let Some(ext) = param.ext {
        request = request.with_ext(ext);
    }
    if let Some(app_id) = param.app_id {
        request = request.with_app_id(app_id);
    }
    Ok(request)
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| render_failure(&error.to_string()))
}

fn render_failure(reason: &str) -> String {
    warn!(%reason, "workflow tool call failed before dispatch");
    let failure = WorkflowToolFailure::new(format!("execution failed: {reason}"));
    serde_json::to_string_pretty(&failure).unwrap_or_else(|_| UNRENDERABLE_FAILURE.to_string())
}
