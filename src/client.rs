// Make.com API Gateway
//
// One low-level request function shared by every operation. Attaches the
// `Authorization: Token <token>` header (the Make.com API uses the Token
// scheme, not Bearer), enforces a fixed timeout, and maps failures into
// the MakeError taxonomy.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::config::MakeConfig;
use crate::error::{MakeError, MakeResult};

/// Per-request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Make.com API client.
///
/// Thin wrapper around `reqwest::Client`; every operation issues exactly one
/// HTTP request (execution polling being the one documented exception).
pub struct MakeClient {
    config: MakeConfig,
    http: Client,
}

impl MakeClient {
    /// Create a client from a validated configuration.
    pub fn new(config: MakeConfig) -> MakeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MakeError::InvalidConfig {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        log::info!("Initialized Make client for {}", config.base_url());
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &MakeConfig {
        &self.config
    }

    /// Perform one authenticated request against the Make.com API.
    ///
    /// - 2xx: parsed JSON body, or `Value::Null` for empty responses.
    /// - non-2xx: `MakeError::Api` with the status code and the parsed error
    ///   body when the remote sent JSON.
    /// - transport failure: `MakeError::Api` with `status: None`.
    ///
    /// No retries are performed here; retry policy is a caller concern.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, String)],
    ) -> MakeResult<Value> {
        let url = format!(
            "{}/{}",
            self.config.base_url(),
            path.trim_start_matches('/')
        );
        log::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.config.api_token()),
            )
            .header(reqwest::header::ACCEPT, "application/json");

        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| MakeError::Api {
            status: None,
            message: format!("{} {} failed: {}", method, path, e.without_url()),
            body: None,
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| MakeError::Api {
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e.without_url()),
            body: None,
        })?;

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(api_error(&method, path, status, &bytes))
    }
}

fn api_error(method: &Method, path: &str, status: StatusCode, bytes: &[u8]) -> MakeError {
    let parsed: Option<Value> = serde_json::from_slice(bytes).ok();
    let detail = match &parsed {
        Some(body) => body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("see response body")
            .to_string(),
        None => String::from_utf8_lossy(bytes).trim().to_string(),
    };
    log::error!("{} {} returned {}: {}", method, path, status, detail);
    MakeError::Api {
        status: Some(status.as_u16()),
        message: format!("{} {} failed: {}", method, path, detail),
        body: parsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_extracts_message_field() {
        let body = json!({"message": "Scenario not found"}).to_string();
        let err = api_error(
            &Method::GET,
            "/scenarios/1/blueprint",
            StatusCode::NOT_FOUND,
            body.as_bytes(),
        );
        match err {
            MakeError::Api { status, message, body } => {
                assert_eq!(status, Some(404));
                assert!(message.contains("Scenario not found"));
                assert!(body.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_keeps_plain_text_body() {
        let err = api_error(
            &Method::DELETE,
            "/hooks/7",
            StatusCode::BAD_REQUEST,
            b"hook is assigned",
        );
        match err {
            MakeError::Api { status, message, body } => {
                assert_eq!(status, Some(400));
                assert!(message.contains("hook is assigned"));
                assert!(body.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
