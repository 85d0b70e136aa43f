// Hook (webhook) resource types
//
// A hook is a remotely provisioned inbound endpoint. The platform binds a
// hook to at most one scenario; the substitution types below exist to work
// around blueprints that embed ids of hooks already bound elsewhere.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::scenario::Scenario;

/// Default webhook type
pub const DEFAULT_WEBHOOK_TYPE: &str = "gateway-webhook";

/// A webhook resource as returned by the remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
    /// Inbound endpoint URL, assigned by the remote on creation
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Set once a scenario referencing this hook has been created
    #[serde(default)]
    pub scenario_id: Option<i64>,
}

impl Hook {
    /// An assigned hook can only be deleted with explicit confirmation.
    pub fn is_assigned(&self) -> bool {
        self.scenario_id.is_some()
    }
}

/// Options for creating a webhook.
#[derive(Debug, Clone)]
pub struct WebhookOptions {
    pub name: String,
    pub type_name: String,
    /// Include the HTTP method in the request body
    pub method: bool,
    /// Include request headers in the request body
    pub headers: bool,
    /// Return JSON payloads as strings
    pub stringify: bool,
    /// Connection id for app-specific webhooks
    pub connection_id: Option<i64>,
    /// Form id for form-specific webhooks
    pub form_id: Option<String>,
}

impl WebhookOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: DEFAULT_WEBHOOK_TYPE.to_string(),
            method: false,
            headers: false,
            stringify: false,
            connection_id: None,
            form_id: None,
        }
    }

    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn method(mut self, method: bool) -> Self {
        self.method = method;
        self
    }

    pub fn headers(mut self, headers: bool) -> Self {
        self.headers = headers;
        self
    }

    pub fn stringify(mut self, stringify: bool) -> Self {
        self.stringify = stringify;
        self
    }

    pub fn connection_id(mut self, connection_id: i64) -> Self {
        self.connection_id = Some(connection_id);
        self
    }

    pub fn form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = Some(form_id.into());
        self
    }
}

/// Result of a hook substitution pass over a blueprint.
#[derive(Debug, Clone)]
pub struct HookReplacement {
    /// Rewritten blueprint; the input blueprint is left untouched
    pub blueprint: Value,
    /// Old hook id -> replacement hook id
    pub mapping: HashMap<i64, i64>,
}

/// A webhook created during substitution, with the id it replaced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWebhook {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub replaced_hook_id: i64,
}

/// A scenario created via the hook substitution path, plus everything the
/// caller needs to surface the new webhook endpoints.
#[derive(Debug, Clone)]
pub struct ScenarioWithHooks {
    pub scenario: Scenario,
    /// Old hook id -> replacement hook id
    pub hook_mapping: HashMap<i64, i64>,
    pub webhooks: Vec<CreatedWebhook>,
}
