use crate::server::prompts::{get_prompt as get_workflow_prompt, list_prompts as list_workflow_prompts};
use crate::server::resources::{
    list_resource_templates as list_workflow_resource_templates, list_resources as list_workflow_resources,
    read_resource as read_workflow_resource,
};
use crate::server::schemas::{RunWorkflowParam, WorkflowStatusParam};
use crate::server::tools;
use coze_mcp_api::CozeWorkflowClient;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ErrorData, ErrorData as McpError, GetPromptRequestParams, GetPromptResult, Implementation, ListPromptsResult,
    ListResourceTemplatesResult, ListResourcesResult, PaginatedRequestParams, ProtocolVersion, ReadResourceRequestParams,
    ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::{ServerHandler, service::RequestContext, tool, tool_handler, tool_router};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// MCP handler exposing Coze workflows.
///
/// One handler is created per MCP session; all of them share the same
/// workflow client.
#[derive(Clone)]
pub struct CozeMcpCore {
    tool_router: ToolRouter<Self>,
    workflow_client: Arc<CozeWorkflowClient>,
}

#[tool_router]
impl CozeMcpCore {
    pub fn new(workflow_client: Arc<CozeWorkflowClient>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            workflow_client,
        }
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Run a published Coze workflow. Input: workflow_id, optional parameters (object of workflow inputs), bot_id, ext, is_async (default false), app_id. Returns a JSON document with code, msg, data, execute_id, debug_url and usage. code 0 means success; any other code is a failure described by msg. For is_async=true, keep execute_id for get_workflow_status."
    )]
    async fn run_coze_workflow(&self, param: Parameters<RunWorkflowParam>) -> Result<CallToolResult, ErrorData> {
        let request_log = serde_json::to_value(&param.0).unwrap_or(Value::Null);
        let text = tools::run_workflow(&self.workflow_client, param.0).await;
        self.emit_log("run_coze_workflow", request_log, &text);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Query the status of an asynchronous workflow run by execute_id. Placeholder: always reports status 'pending' and does not contact the platform."
    )]
    async fn get_workflow_status(&self, param: Parameters<WorkflowStatusParam>) -> Result<CallToolResult, ErrorData> {
        let text = tools::workflow_status(&param.0);
        self.emit_log(
            "get_workflow_status",
            serde_json::to_value(&param.0).unwrap_or(Value::Null),
            &text,
        );
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    fn emit_log(&self, tool_name: &str, request: Value, response_text: &str) {
        debug!(tool = tool_name, request = %request, response = %response_text, "MCP tool call");
    }
}

#[tool_handler]
impl ServerHandler for CozeMcpCore {
    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(list_workflow_resources()))
    }

    fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourceTemplatesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(list_workflow_resource_templates()))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        std::future::ready(read_workflow_resource(&request.uri))
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(list_workflow_prompts()))
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<GetPromptResult, McpError>> + Send + '_ {
        std::future::ready(get_workflow_prompt(&request.name, request.arguments.as_ref()))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "CozeWorkflow".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Coze Workflow MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Runs published Coze workflows.\n- run_coze_workflow executes a workflow by workflow_id with a parameters object and returns code/msg/data/execute_id/debug_url/usage as JSON text; code 0 is success.\n- get_workflow_status is a placeholder for asynchronous runs.\n- Read coze://workflow/{workflow_id} for usage notes on a workflow.\n- The create_workflow_execution_prompt prompt plans a run for a task description.".to_string(),
            ),
        }
    }
}
