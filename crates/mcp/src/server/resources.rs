//! Workflow info resources addressed as `coze://workflow/{workflow_id}`.

use crate::server::errors::{invalid_params_error, not_found_error};
use rmcp::model::{AnnotateAble, ListResourceTemplatesResult, ListResourcesResult, RawResourceTemplate, ReadResourceResult, ResourceContents};

const WORKFLOW_URI_PREFIX: &str = "coze://workflow/";
const WORKFLOW_URI_TEMPLATE: &str = "coze://workflow/{workflow_id}";

/// Workflows are addressed by id only, so there is nothing to enumerate.
pub fn list_resources() -> ListResourcesResult {
    ListResourcesResult::with_all_items(Vec::new())
}

pub fn list_resource_templates() -> ListResourceTemplatesResult {
    let templates = vec![
        RawResourceTemplate {
            uri_template: WORKFLOW_URI_TEMPLATE.to_string(),
            name: "workflow.info".to_string(),
            title: Some("Coze workflow info".to_string()),
            description: Some("How to run a published Coze workflow with the run_coze_workflow tool.".to_string()),
            mime_type: Some("text/markdown".to_string()),
            icons: None,
        }
        .no_annotation(),
    ];
    ListResourceTemplatesResult::with_all_items(templates)
}

pub fn read_resource(uri: &str) -> Result<ReadResourceResult, rmcp::model::ErrorData> {
    let Some(workflow_id) = uri.strip_prefix(WORKFLOW_URI_PREFIX) else {
        return Err(not_found_error(
            "RESOURCE_NOT_FOUND",
            format!("resource '{uri}' was not found"),
            serde_json::json!({ "uri": uri }),
            "Use coze://workflow/{workflow_id}.",
        ));
    };
    if workflow_id.trim().is_empty() || workflow_id.contains('/') {
        return Err(invalid_params_error(
            "WORKFLOW_RESOURCE_IDENTIFIER_INVALID",
            "workflow resource URI must end with a single workflow identifier",
            serde_json::json!({ "uri": uri }),
            "Use coze://workflow/{workflow_id}.",
        ));
    }

    Ok(ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some("text/markdown".to_string()),
            text: workflow_info_markdown(workflow_id),
            meta: None,
        }],
    })
}

fn workflow_info_markdown(workflow_id: &str) -> String {
    format!(
        "# Workflow info\n\n\
         **Workflow ID**: {workflow_id}\n\n\
         **Description**: A workflow hosted on the Coze platform. Run it with the `run_coze_workflow` tool.\n\n\
         **Usage**:\n\
         ```json\n\
         {{\n  \"workflow_id\": \"{workflow_id}\",\n  \"parameters\": {{ \"key\": \"value\" }}\n}}\n\
         ```\n\n\
         **Notes**:\n\
         - The workflow must be published before it can run\n\
         - Some workflows require an associated bot_id\n\
         - Both synchronous and asynchronous (`is_async`) execution are supported\n"
    )
}
