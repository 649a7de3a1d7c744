use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use coze_mcp_types::{FAILURE_CODE, MISSING_MESSAGE, WorkflowRunRequest, WorkflowRunResponse};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::CozeConfig;
use crate::error::WorkflowCallError;

/// Upper bound on one workflow call, connect through body read.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pooled client for the Coze workflow run endpoint.
///
/// One instance is shared by every MCP session; `reqwest::Client` handles
/// connection-level concurrency. The pool sits in an `Option` so [`close`]
/// can release it while other handles to the client are still alive.
///
/// [`close`]: CozeWorkflowClient::close
#[derive(Debug)]
pub struct CozeWorkflowClient {
    config: Arc<CozeConfig>,
    http: Mutex<Option<Client>>,
}

impl CozeWorkflowClient {
    /// Build a client with the standard 30 second request timeout.
    pub fn new(config: Arc<CozeConfig>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build().context("build http client")?;
        Ok(Self::with_http_client(config, http))
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn with_http_client(config: Arc<CozeConfig>, http: Client) -> Self {
        Self {
            config,
            http: Mutex::new(Some(http)),
        }
    }

    pub fn config(&self) -> &CozeConfig {
        &self.config
    }

    /// Run one workflow and return its normalized outcome.
    ///
    /// Never fails: transport errors, HTTP errors, malformed bodies and
    /// internal faults all come back as a response with a non-zero `code`.
    /// Exactly one request is sent; there are no retries.
    pub async fn run_workflow(&self, request: &WorkflowRunRequest) -> WorkflowRunResponse {
        match self.execute(request).await {
            Ok(response) => {
                info!(workflow_id = %request.workflow_id, code = response.code, "workflow run finished");
                response
            }
            Err(error) => {
                warn!(workflow_id = %request.workflow_id, kind = error.kind(), %error, "workflow run failed");
                error.into_response()
            }
        }
    }

    /// Release the connection pool.
    ///
    /// Returns `true` on the call that actually closed the client and `false`
    /// afterwards. Later [`run_workflow`](Self::run_workflow) calls report the
    /// closed state without touching the network.
    pub fn close(&self) -> bool {
        let mut slot = match self.http.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        let closed = slot.take().is_some();
        if closed {
            info!("workflow client closed");
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.http.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }

    async fn execute(&self, request: &WorkflowRunRequest) -> Result<WorkflowRunResponse, WorkflowCallError> {
        let http = self.http_handle()?;
        let payload = request
            .to_payload()
            .map_err(|error| WorkflowCallError::Unexpected(format!("failed to encode request: {error}")))?;
        let url = self.config.api_url();
        debug!(%url, workflow_id = %request.workflow_id, "posting workflow run");

        let mut builder = http.post(&url);
        for (name, value) in self.config.headers() {
            builder = builder.header(name, value);
        }
        let response = builder.json(&payload).send().await.map_err(WorkflowCallError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(WorkflowCallError::Transport)?;
        if !status.is_success() {
            return Err(WorkflowCallError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_run_body(&body)
    }

    /// Clone the pooled handle out of the slot so the lock is never held across an await.
    fn http_handle(&self) -> Result<Client, WorkflowCallError> {
        let slot = self
            .http
            .lock()
            .map_err(|error| WorkflowCallError::Unexpected(format!("client state lock poisoned: {error}")))?;
        slot.clone().ok_or(WorkflowCallError::Closed)
    }
}

/// Body of a successful workflow run as the platform sends it.
///
/// Every field is optional here; [`From`] applies the defaults. Unknown fields
/// are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunBody {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<String>,
    execute_id: Option<String>,
    debug_url: Option<String>,
    detail: Option<Map<String, Value>>,
    usage: Option<Map<String, Value>>,
}

impl From<RunBody> for WorkflowRunResponse {
    fn from(body: RunBody) -> Self {
        WorkflowRunResponse {
            code: body.code.unwrap_or(FAILURE_CODE),
            msg: body.msg.unwrap_or_else(|| MISSING_MESSAGE.to_string()),
            data: body.data,
            execute_id: body.execute_id,
            debug_url: body.debug_url,
            detail: body.detail,
            usage: body.usage,
        }
    }
}

/// Parse a 2xx body. Anything other than a JSON object is a parse error.
fn parse_run_body(body: &str) -> Result<WorkflowRunResponse, WorkflowCallError> {
    let object: Map<String, Value> = serde_json::from_str(body)?;
    let parsed: RunBody = serde_json::from_value(Value::Object(object))?;
    Ok(parsed.into())
}
