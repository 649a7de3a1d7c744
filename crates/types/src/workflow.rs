//! Request and response shapes for `POST /v1/workflow/run`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Status code used for every failure that did not come from an HTTP status.
pub const FAILURE_CODE: i64 = -1;

/// Message substituted when a successful response carries no `msg`.
pub const MISSING_MESSAGE: &str = "response format error";

/// Message used when a response is constructed without one.
const DEFAULT_MESSAGE: &str = "Unknown error";

/// A single workflow execution request.
///
/// Serializing this value produces the outbound request body: `workflow_id`
/// is always present, `is_async` whenever it is set (even to `false`), and the
/// remaining optional fields only when they carry a non-empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunRequest {
    /// Identifier of a published workflow on the platform.
    pub workflow_id: String,
    /// Input parameters keyed by the workflow's start-node variable names.
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub parameters: Option<Map<String, Value>>,
    /// Agent the workflow should run on behalf of.
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub bot_id: Option<String>,
    /// Extra string fields forwarded to the platform unchanged.
    #[serde(default, skip_serializing_if = "is_empty_ext")]
    pub ext: Option<BTreeMap<String, String>>,
    #[serde(default = "default_is_async", skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub app_id: Option<String>,
}

impl WorkflowRunRequest {
    /// Create a synchronous request for `workflow_id` with no other fields set.
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            parameters: None,
            bot_id: None,
            ext: None,
            is_async: default_is_async(),
            app_id: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.bot_id = Some(bot_id.into());
        self
    }

    pub fn with_ext(mut self, ext: BTreeMap<String, String>) -> Self {
        self.ext = Some(ext);
        self
    }

    /// Set or clear the async flag. `None` omits `is_async` from the body entirely.
    pub fn with_async(mut self, is_async: Option<bool>) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Render the outbound JSON body.
    pub fn to_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

fn default_is_async() -> Option<bool> {
    Some(false)
}

fn is_empty_string(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn is_empty_map(value: &Option<Map<String, Value>>) -> bool {
    value.as_ref().is_none_or(Map::is_empty)
}

fn is_empty_ext(value: &Option<BTreeMap<String, String>>) -> bool {
    value.as_ref().is_none_or(BTreeMap::is_empty)
}

/// Normalized outcome of a workflow run.
///
/// Every field is always serialized, with explicit `null` for absent values,
/// whether the run succeeded or failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunResponse {
    /// Platform status code, the HTTP status for HTTP failures, or `-1`.
    pub code: i64,
    pub msg: String,
    /// Workflow output, usually a JSON document encoded as a string.
    pub data: Option<String>,
    /// Execution id returned for asynchronous runs.
    pub execute_id: Option<String>,
    pub debug_url: Option<String>,
    pub detail: Option<Map<String, Value>>,
    /// Token accounting reported by the platform.
    pub usage: Option<Map<String, Value>>,
}

impl Default for WorkflowRunResponse {
    fn default() -> Self {
        Self {
            code: FAILURE_CODE,
            msg: DEFAULT_MESSAGE.to_string(),
            data: None,
            execute_id: None,
            debug_url: None,
            detail: None,
            usage: None,
        }
    }
}

impl WorkflowRunResponse {
    /// Build a response carrying only a code and a message.
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Project the response onto the fields exposed by the MCP tool.
    pub fn to_tool_output(&self) -> WorkflowToolOutput {
        WorkflowToolOutput {
            code: self.code,
            msg: self.msg.clone(),
            data: self.data.clone(),
            execute_id: self.execute_id.clone(),
            debug_url: self.debug_url.clone(),
            usage: self.usage.clone(),
        }
    }
}

/// JSON document returned by the `run_coze_workflow` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowToolOutput {
    pub code: i64,
    pub msg: String,
    pub data: Option<String>,
    pub execute_id: Option<String>,
    pub debug_url: Option<String>,
    pub usage: Option<Map<String, Value>>,
}

/// JSON document returned by the tool layer when a request could not be dispatched at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowToolFailure {
    pub code: i64,
    pub msg: String,
    pub data: Option<String>,
}

impl WorkflowToolFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            code: FAILURE_CODE,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Fixed answer of the status lookup tool.
///
/// The platform's asynchronous status query is not wired up; this only echoes
/// the execution id back with a pending status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatusPlaceholder {
    pub code: i64,
    pub msg: String,
    pub execute_id: String,
    pub status: String,
}

impl WorkflowStatusPlaceholder {
    pub fn pending(execute_id: impl Into<String>) -> Self {
        Self {
            code: 0,
            msg: "workflow status query is not implemented".to_string(),
            execute_id: execute_id.into(),
            status: "pending".to_string(),
        }
    }
}
