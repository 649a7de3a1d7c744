//! Prompt that walks a model through running a workflow for a task.

use crate::server::errors::{invalid_params_error, not_found_error};
use rmcp::model::{GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole};
use serde_json::{Map, Value};

const EXECUTION_PROMPT: &str = "create_workflow_execution_prompt";

pub fn list_prompts() -> rmcp::model::ListPromptsResult {
    rmcp::model::ListPromptsResult::with_all_items(vec![Prompt {
        name: EXECUTION_PROMPT.to_string(),
        title: None,
        description: Some("Create instructions for running a Coze workflow to accomplish a task.".to_string()),
        arguments: Some(vec![
            required_argument("workflow_id", "Workflow identifier"),
            required_argument("task_description", "What the workflow run should accomplish"),
        ]),
        icons: None,
        meta: None,
    }])
}

pub fn get_prompt(name: &str, arguments: Option<&Map<String, Value>>) -> Result<GetPromptResult, rmcp::model::ErrorData> {
    if name != EXECUTION_PROMPT {
        return Err(not_found_error(
            "PROMPT_NOT_FOUND",
            format!("prompt '{name}' was not found"),
            serde_json::json!({ "name": name }),
            "Call prompts/list to inspect available prompts.",
        ));
    }

    let workflow_id = require_string_argument(arguments, "workflow_id")?;
    let task_description = require_string_argument(arguments, "task_description")?;

    Ok(GetPromptResult {
        description: Some("Run a Coze workflow for the described task.".to_string()),
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Run the following Coze workflow task:\n\n\
                 **Task description**: {task_description}\n\
                 **Workflow ID**: {workflow_id}\n\n\
                 Use the run_coze_workflow tool to execute this workflow, choosing parameters that fit the task.\n\n\
                 Steps:\n\
                 1. Work out which input parameters the task needs\n\
                 2. Call run_coze_workflow\n\
                 3. Interpret the result\n\
                 4. If needed, open debug_url to inspect the execution trace"
            ),
        )],
    })
}

fn required_argument(name: &str, description: &str) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(true),
    }
}

fn require_string_argument(arguments: Option<&Map<String, Value>>, key: &str) -> Result<String, rmcp::model::ErrorData> {
    match arguments.and_then(|args| args.get(key)).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(invalid_params_error(
            "PROMPT_ARGUMENT_MISSING",
            format!("prompt argument '{key}' is required"),
            serde_json::json!({ "argument": key }),
            "Provide workflow_id and task_description and retry.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect()
    }

    #[test]
    fn list_prompts_exposes_execution_prompt() {
        let prompts = list_prompts();
        assert_eq!(prompts.prompts.len(), 1);
        assert_eq!(prompts.prompts[0].name, "create_workflow_execution_prompt");
        assert_eq!(prompts.prompts[0].arguments.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn get_prompt_mentions_workflow_and_task() {
        let args = arguments(&[("workflow_id", "test_workflow_123"), ("task_description", "summarize the report")]);
        let result = get_prompt("create_workflow_execution_prompt", Some(&args)).unwrap();
        assert_eq!(result.messages.len(), 1);
        let rendered = serde_json::to_string(&result.messages[0]).unwrap();
        assert!(rendered.contains("test_workflow_123"));
        assert!(rendered.contains("summarize the report"));
        assert!(rendered.contains("run_coze_workflow"));
    }

    #[test]
    fn get_prompt_requires_both_arguments() {
        let args = arguments(&[("workflow_id", "w")]);
        let error = get_prompt("create_workflow_execution_prompt", Some(&args)).expect_err("task_description is required");
        assert_eq!(error.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn unknown_prompt_is_not_found() {
        let error = get_prompt("workflow.author", None).unwrap_err();
        assert_eq!(error.code, rmcp::model::ErrorCode::RESOURCE_NOT_FOUND);
    }
}
