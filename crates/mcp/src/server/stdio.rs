//! Stdio host for the MCP handler, for clients that spawn the server as a child process.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use coze_mcp_api::CozeWorkflowClient;
use rmcp::transport::{IntoTransport, stdio};
use rmcp::{RoleServer, ServiceExt};
use tracing::info;

use crate::server::core::CozeMcpCore;

/// Serve MCP over stdin/stdout until the peer disconnects or `shutdown` resolves.
///
/// Stdout carries protocol frames only; logging must go to stderr.
pub async fn serve_stdio<F>(workflow_client: Arc<CozeWorkflowClient>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    serve_io(workflow_client, stdio(), shutdown).await
}

/// Serve one MCP session over any byte-stream transport.
pub async fn serve_io<T, E, A, F>(workflow_client: Arc<CozeWorkflowClient>, transport: T, shutdown: F) -> Result<()>
where
    T: IntoTransport<RoleServer, E, A>,
    E: std::error::Error + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let running = CozeMcpCore::new(workflow_client)
        .serve(transport)
        .await
        .context("start MCP stdio service")?;
    info!("MCP stdio service ready");

    let cancellation_token = running.cancellation_token();
    let shutdown_task = tokio::spawn(async move {
        shutdown.await;
        cancellation_token.cancel();
    });

    let quit_reason = running.waiting().await.context("MCP stdio service task failed")?;
    shutdown_task.abort();
    info!(?quit_reason, "MCP stdio service stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coze_mcp_api::CozeConfig;
    use rmcp::model::CallToolRequestParams;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn arguments(value: Value) -> Option<serde_json::Map<String, Value>> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn session_runs_workflow_tool_through_the_router() {
        let platform = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/workflow/run"))
            .and(body_json(json!({ "workflow_id": "123", "parameters": { "k": "v" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "success", "data": "done" })))
            .expect(1)
            .mount(&platform)
            .await;
        let workflow_client = Arc::new(CozeWorkflowClient::new(Arc::new(CozeConfig::new(platform.uri(), "pat_test", 8000))).unwrap());

        let (server_io, client_io) = tokio::io::duplex(64 * 1024);
        let server = serve_io(workflow_client, server_io, std::future::pending());
        let session = async {
            let peer = ().serve(client_io).await.expect("client handshake");
            let run = peer
                .call_tool(CallToolRequestParams {
                    name: "run_coze_workflow".into(),
                    arguments: arguments(json!({ "workflow_id": "123", "parameters": { "k": "v" }, "is_async": null })),
                    task: None,
                    meta: None,
                })
                .await;
            let missing_id = peer
                .call_tool(CallToolRequestParams {
                    name: "run_coze_workflow".into(),
                    arguments: arguments(json!({ "parameters": {} })),
                    task: None,
                    meta: None,
                })
                .await;
            peer.cancel().await.expect("client shutdown");
            (run, missing_id)
        };

        let (served, (run, missing_id)) = tokio::join!(server, session);
        served.expect("server exits cleanly when the peer disconnects");

        let result = serde_json::to_value(run.expect("tool call succeeds")).unwrap();
        let text = result["content"][0]["text"].as_str().expect("text content");
        let document: Value = serde_json::from_str(text).unwrap();
        assert_eq!(document["code"], 0);
        assert_eq!(document["data"], "done");
        assert!(missing_id.is_err(), "arguments without workflow_id are rejected by the router");
    }
}
