// Make.com Client Error Types

use serde_json::Value;
use thiserror::Error;

/// Make.com client error
#[derive(Error, Debug)]
pub enum MakeError {
    /// Invalid configuration (bad token, scope, or base URL)
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Required environment variable is not set
    #[error("Missing environment variable: {name}")]
    MissingEnv { name: String },

    /// Blueprint failed client-side validation (no request was sent)
    #[error("Invalid blueprint: {message}")]
    Validation { message: String },

    /// API request failed. `status` is `None` for transport failures
    /// (DNS, connection, timeout). Never contains the API token.
    #[error("Make API error{}: {message}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
        body: Option<Value>,
    },

    /// Scenario execution did not reach a terminal state within the poll budget
    #[error("Execution did not complete after {attempts} status polls")]
    ExecutionTimeout { attempts: u32 },

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for Make.com client operations
pub type MakeResult<T> = Result<T, MakeError>;

/// Error codes for downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeErrorCode {
    InvalidConfig,
    MissingEnv,
    Validation,
    Api,
    ExecutionTimeout,
    Parse,
}

impl MakeErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MakeErrorCode::InvalidConfig => "MAKE_INVALID_CONFIG",
            MakeErrorCode::MissingEnv => "MAKE_MISSING_ENV",
            MakeErrorCode::Validation => "MAKE_INVALID_BLUEPRINT",
            MakeErrorCode::Api => "MAKE_API_ERROR",
            MakeErrorCode::ExecutionTimeout => "MAKE_EXECUTION_TIMEOUT",
            MakeErrorCode::Parse => "MAKE_PARSE_ERROR",
        }
    }
}

impl MakeError {
    pub fn code(&self) -> MakeErrorCode {
        match self {
            MakeError::InvalidConfig { .. } => MakeErrorCode::InvalidConfig,
            MakeError::MissingEnv { .. } => MakeErrorCode::MissingEnv,
            MakeError::Validation { .. } => MakeErrorCode::Validation,
            MakeError::Api { .. } => MakeErrorCode::Api,
            MakeError::ExecutionTimeout { .. } => MakeErrorCode::ExecutionTimeout,
            MakeError::Parse(_) => MakeErrorCode::Parse,
        }
    }

    /// True when the remote rejected a request because the referenced hook
    /// already has a scenario assigned. Callers recover by re-running the
    /// creation through the hook substitution path instead of retrying.
    pub fn is_hook_conflict(&self) -> bool {
        let MakeError::Api { status, message, body } = self else {
            return false;
        };
        if matches!(status, Some(409) | Some(422)) {
            return true;
        }
        let body_text = body.as_ref().map(Value::to_string).unwrap_or_default();
        let haystack = format!("{} {}", message, body_text).to_lowercase();
        haystack.contains("hook") && haystack.contains("assigned")
    }
}

impl From<MakeError> for String {
    fn from(err: MakeError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_message_includes_status() {
        let err = MakeError::Api {
            status: Some(400),
            message: "missing required parameter".to_string(),
            body: None,
        };
        assert!(err.to_string().contains("status 400"));
        assert_eq!(err.code().as_str(), "MAKE_API_ERROR");
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = MakeError::Api {
            status: None,
            message: "connection refused".to_string(),
            body: None,
        };
        assert!(!err.to_string().contains("status"));
        assert!(!err.is_hook_conflict());
    }

    #[test]
    fn test_hook_conflict_detected_by_status() {
        let err = MakeError::Api {
            status: Some(409),
            message: "conflict".to_string(),
            body: None,
        };
        assert!(err.is_hook_conflict());
    }

    #[test]
    fn test_hook_conflict_detected_by_body_message() {
        let err = MakeError::Api {
            status: Some(400),
            message: "request failed".to_string(),
            body: Some(json!({"message": "The hook is already assigned to a scenario"})),
        };
        assert!(err.is_hook_conflict());
    }

    #[test]
    fn test_config_error_is_not_a_conflict() {
        let err = MakeError::InvalidConfig {
            message: "API token is required".to_string(),
        };
        assert!(!err.is_hook_conflict());
        assert_eq!(err.code(), MakeErrorCode::InvalidConfig);
    }
}
