use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Arguments of the `run_coze_workflow` tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunWorkflowParam {
    #[schemars(description = "Identifier of a published Coze workflow.")]
    pub workflow_id: String,
    #[schemars(description = "Workflow input parameters as a key/value object, keyed by the start node's variable names.")]
    pub parameters: Option<Map<String, Value>>,
    #[schemars(description = "Optional agent (bot) id the workflow is associated with.")]
    pub bot_id: Option<String>,
    #[schemars(description = "Optional extra string fields forwarded to the platform unchanged.")]
    pub ext: Option<BTreeMap<String, String>>,
    /// Defaults to synchronous execution.
    #[serde(default = "default_is_async")]
    #[schemars(description = "Run asynchronously and return an execute_id instead of the result. Defaults to false.")]
    pub is_async: Option<bool>,
    #[schemars(description = "Optional application id.")]
    pub app_id: Option<String>,
}

fn default_is_async() -> Option<bool> {
    Some(false)
}

/// Arguments of the `get_workflow_status` tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkflowStatusParam {
    #[schemars(description = "execute_id returned by an asynchronous run_coze_workflow call.")]
    pub execute_id: String,
}
