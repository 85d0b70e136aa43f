// Scenario resource types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A deployed scenario as returned by the remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A scenario execution record.
///
/// When `run_scenario` is called without waiting this is the initial
/// acknowledgement (status unset); with waiting it is the final record.
#[derive(Debug, Clone)]
pub struct Execution {
    pub execution_id: Option<String>,
    pub status: Option<String>,
    /// Raw response for fields not modeled here
    pub raw: Value,
}

impl Execution {
    pub(crate) fn from_response(raw: Value) -> Self {
        let execution_id = raw
            .get("executionId")
            .or_else(|| raw.get("id"))
            .and_then(value_to_id_string);
        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            execution_id,
            status,
            raw,
        }
    }

    /// Terminal execution states; polling stops here.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some("success") | Some("error") | Some("failed")
        )
    }
}

fn value_to_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execution_from_ack() {
        let exec = Execution::from_response(json!({"executionId": "abc123"}));
        assert_eq!(exec.execution_id.as_deref(), Some("abc123"));
        assert_eq!(exec.status, None);
        assert!(!exec.is_terminal());
    }

    #[test]
    fn test_execution_terminal_states() {
        for status in ["success", "error", "failed"] {
            let exec = Execution::from_response(json!({"id": 9, "status": status}));
            assert!(exec.is_terminal(), "{} should be terminal", status);
        }
        let pending = Execution::from_response(json!({"id": 9, "status": "running"}));
        assert!(!pending.is_terminal());
    }

    #[test]
    fn test_scenario_deserializes_with_missing_fields() {
        let scenario: Scenario = serde_json::from_value(json!({"id": 5})).unwrap();
        assert_eq!(scenario.id, 5);
        assert!(!scenario.is_active);
        assert_eq!(scenario.team_id, None);
    }
}
