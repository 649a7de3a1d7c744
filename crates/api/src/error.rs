//! Failure modes of a single workflow call.

use coze_mcp_types::{FAILURE_CODE, WorkflowRunResponse};
use std::error::Error as StdError;
use thiserror::Error;

/// Everything that can go wrong between building a request and reading a
/// parsed response. None of these escape [`crate::CozeWorkflowClient::run_workflow`];
/// each is folded into a [`WorkflowRunResponse`] via [`WorkflowCallError::into_response`].
#[derive(Debug, Error)]
pub enum WorkflowCallError {
    /// The exchange did not complete: connect, DNS, TLS, timeout, body read,
    /// or a request that could not be built from the configured URL/headers.
    #[error("request error: {}", describe_chain(.0))]
    Transport(#[source] reqwest::Error),

    /// The platform answered with a non-2xx status.
    #[error("HTTP error: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    /// A 2xx body that is not a JSON object of the expected shape.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected error: workflow client is closed")]
    Closed,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl WorkflowCallError {
    /// Status code reported to callers for this failure.
    pub fn code(&self) -> i64 {
        match self {
            WorkflowCallError::HttpStatus { status, .. } => i64::from(*status),
            _ => FAILURE_CODE,
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowCallError::Transport(_) => "transport",
            WorkflowCallError::HttpStatus { .. } => "http_status",
            WorkflowCallError::Parse(_) => "parse",
            WorkflowCallError::Closed | WorkflowCallError::Unexpected(_) => "unexpected",
        }
    }

    pub fn into_response(self) -> WorkflowRunResponse {
        WorkflowRunResponse::failure(self.code(), self.to_string())
    }
}

impl From<WorkflowCallError> for WorkflowRunResponse {
    fn from(error: WorkflowCallError) -> Self {
        error.into_response()
    }
}

/// reqwest's top-level message rarely names the cause ("error sending
/// request"), so append the source chain.
fn describe_chain(error: &reqwest::Error) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !description.contains(&cause_text) {
            description.push_str(": ");
            description.push_str(&cause_text);
        }
        source = cause.source();
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_keeps_status_as_code_and_body_in_message() {
        let response = WorkflowCallError::HttpStatus {
            status: 500,
            body: "server error".to_string(),
        }
        .into_response();
        assert_eq!(response.code, 500);
        assert_eq!(response.msg, "HTTP error: 500 - server error");
        assert!(response.data.is_none());
        assert!(response.execute_id.is_none());
        assert!(response.debug_url.is_none());
    }

    #[test]
    fn parse_failure_reports_failure_code() {
        let parse_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error = WorkflowCallError::from(parse_error);
        assert_eq!(error.kind(), "parse");
        let response = WorkflowRunResponse::from(error);
        assert_eq!(response.code, FAILURE_CODE);
        assert!(response.msg.starts_with("response parse error: "));
    }

    #[test]
    fn closed_client_is_reported_as_unexpected() {
        let error = WorkflowCallError::Closed;
        assert_eq!(error.kind(), "unexpected");
        assert_eq!(error.into_response().msg, "unexpected error: workflow client is closed");
    }
}
