//! Structured MCP error helpers.

use chrono::Utc;
use rmcp::model::ErrorData;
use serde_json::Value;

fn build_error_data(error_code: &str, category: &str, message: &str, context: Value, suggested_action: &str) -> Value {
    serde_json::json!({
        "error_code": error_code,
        "category": category,
        "message": message,
        "context": context,
        "retryable": false,
        "suggested_action": suggested_action,
        "correlation_id": format!("coze-mcp-{}", Utc::now().timestamp_millis()),
    })
}

pub fn invalid_params_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::invalid_params(
        message.clone(),
        Some(build_error_data(error_code, "validation", &message, context, suggested_action)),
    )
}

pub fn not_found_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::resource_not_found(
        message.clone(),
        Some(build_error_data(error_code, "not_found", &message, context, suggested_action)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_data_carries_code_and_suggestion() {
        let error = invalid_params_error(
            "PROMPT_ARGUMENT_MISSING",
            "missing",
            serde_json::json!({ "argument": "workflow_id" }),
            "Provide it.",
        );
        assert_eq!(error.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        let data = error.data.expect("structured data");
        assert_eq!(data["error_code"], "PROMPT_ARGUMENT_MISSING");
        assert_eq!(data["category"], "validation");
        assert_eq!(data["suggested_action"], "Provide it.");
        assert!(data["correlation_id"].as_str().unwrap().starts_with("coze-mcp-"));
    }

    #[test]
    fn not_found_uses_resource_not_found_code() {
        let error = not_found_error("X", "gone", Value::Null, "Look elsewhere.");
        assert_eq!(error.code, rmcp::model::ErrorCode::RESOURCE_NOT_FOUND);
    }
}
