//! The two in-process tools exposed to the model.

use crate::audit::ActionLogger;
use crate::tool::{ExecutionResult, Tool};
use crate::validation;
use async_trait::async_trait;
use serde_json::{Value, json};

pub const LOG_ACTION: &str = "log_action";
pub const VALIDATE_REQUEST: &str = "validate_request";

fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, ExecutionResult> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ExecutionResult::invalid_input(format!("'{}' must be a string", key)))
}

/// `log_action(action, target, result, details?)`
#[derive(Debug, Clone)]
pub struct LogActionTool {
    logger: ActionLogger,
}

impl LogActionTool {
    pub fn new(logger: ActionLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl Tool for LogActionTool {
    fn name(&self) -> &str {
        LOG_ACTION
    }

    fn description(&self) -> &str {
        "Log an action to the audit trail. Call this after every important change, \
         with the action name, the target identifier, the result status and any \
         relevant details."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "description": "Action performed, e.g. create_user" },
                "target": { "type": "string", "description": "Identifier of the affected entity" },
                "result": { "type": "string", "description": "Result status, e.g. success or failure" },
                "details": { "type": "object", "description": "Additional details" }
            },
            "required": ["action", "target", "result"]
        })
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let (action, target, result) = match (
            required_str(&input, "action"),
            required_str(&input, "target"),
            required_str(&input, "result"),
        ) {
            (Ok(a), Ok(t), Ok(r)) => (a, t, r),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return e,
        };

        let details = match input.get("details") {
            None | Some(Value::Null) => Default::default(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return ExecutionResult::invalid_input("'details' must be an object"),
        };

        let record = self.logger.log_action(action, target, result, details);
        ExecutionResult::success(format!(
            "Logged: {} on {}: {}",
            record.action, record.target, record.status
        ))
    }
}

/// `validate_request(request_type, data)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateRequestTool;

impl ValidateRequestTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ValidateRequestTool {
    fn name(&self) -> &str {
        VALIDATE_REQUEST
    }

    fn description(&self) -> &str {
        "Validate a structured identity request before acting on it. Supported \
         request types: create_user (email, first_name, last_name), grant_access \
         (user_id, resource_id), assign_group (user_id, group_id)."
    }

    fn input_schema(&self) -> Value {
        let types: Vec<&str> = validation::request_types().collect();
        json!({
            "type": "object",
            "properties": {
                "request_type": { "type": "string", "enum": types },
                "data": { "type": "object", "description": "Request fields" }
            },
            "required": ["request_type", "data"]
        })
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let request_type = match required_str(&input, "request_type") {
            Ok(t) => t,
            Err(e) => return e,
        };
        let data = input.get("data").unwrap_or(&Value::Null);

        let outcome = validation::validate_value(request_type, data);
        ExecutionResult::success(validation::report(&outcome).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemorySink;
    use crate::tool::FailureReason;

    #[tokio::test]
    async fn log_action_tool_writes_one_record() {
        let sink = MemorySink::new();
        let tool = LogActionTool::new(ActionLogger::new(sink.clone()));

        let result = tool
            .call(json!({
                "action": "create_user",
                "target": "a@b.com",
                "result": "success",
                "details": {"system": "pingone"}
            }))
            .await;

        assert_eq!(
            result,
            ExecutionResult::success("Logged: create_user on a@b.com: success")
        );
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].details["system"], "pingone");
    }

    #[tokio::test]
    async fn log_action_tool_requires_fields() {
        let sink = MemorySink::new();
        let tool = LogActionTool::new(ActionLogger::new(sink.clone()));

        let result = tool.call(json!({"action": "create_user"})).await;
        assert!(matches!(
            result.failure_reason(),
            Some(FailureReason::InvalidInput { .. })
        ));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn validate_request_tool_reports_missing_fields() {
        let result = ValidateRequestTool
            .call(json!({
                "request_type": "create_user",
                "data": {"email": "a@b.com", "first_name": "A"}
            }))
            .await;

        let report: Value = serde_json::from_str(&result.output()).unwrap();
        assert_eq!(
            report,
            json!({"valid": false, "error": "Missing fields: last_name"})
        );
    }

    #[tokio::test]
    async fn validate_request_tool_accepts_complete_request() {
        let result = ValidateRequestTool
            .call(json!({
                "request_type": "grant_access",
                "data": {"user_id": "u1", "resource_id": "r1"}
            }))
            .await;

        assert_eq!(result, ExecutionResult::success(r#"{"valid":true}"#));
    }

    #[test]
    fn schemas_list_required_arguments() {
        let schema = ValidateRequestTool.input_schema();
        assert_eq!(schema["required"], json!(["request_type", "data"]));
        assert_eq!(
            schema["properties"]["request_type"]["enum"],
            json!(["create_user", "grant_access", "assign_group"])
        );
    }
}
