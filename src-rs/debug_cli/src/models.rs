use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub principal: String,
    /// Seconds between polls in `/wait`.
    pub poll_interval: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub model: String,
    pub spec_example: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name_example: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralRequest {
    pub product_name: String,
    pub spec_example: String,
}

/// How the server answered a generation request.
#[derive(Debug, PartialEq)]
pub enum SubmitReply {
    Finished(Value),
    Accepted(String),
    Failed(String),
    Cancelled,
    Refused(String),
}

#[derive(Debug, Deserialize)]
pub struct TaskPoll {
    pub status: String,
    pub result: Option<Value>,
    pub error: Option<String>,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<String>,
}

impl TaskPoll {
    pub fn is_terminal(&self) -> bool {
        self.status != "RUNNING"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_decodes_wire_shape() {
        let poll: TaskPoll = serde_json::from_str(r#"{"status":"FAILED","error":"boom"}"#).unwrap();
        assert!(poll.is_terminal());
        assert_eq!(poll.error.as_deref(), Some("boom"));

        let running: TaskPoll = serde_json::from_str(r#"{"status":"RUNNING","createdAt":"2026-01-01T00:00:00Z"}"#).unwrap();
        assert!(!running.is_terminal());
    }

    #[test]
    fn submit_request_is_camel_case() {
        let body = serde_json::to_value(SubmitRequest {
            model: "AX40".to_string(),
            spec_example: "area".to_string(),
            product_name_example: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"model": "AX40", "specExample": "area"}));
    }
}
