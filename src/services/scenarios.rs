// Scenario Operations
//
// CRUD and control operations over scenarios: list, fetch blueprint, create,
// clone, update, activate/deactivate, run (optionally polling to a terminal
// state), delete. Every operation issues requests through the gateway and
// propagates `MakeError::Api` unchanged.

use std::collections::HashMap;

use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::client::MakeClient;
use crate::error::{MakeError, MakeResult};
use crate::models::{Execution, Scenario};
use crate::services::blueprint::{format_blueprint_for_api, parse_blueprint, validate_blueprint};

/// Maximum execution status polls before giving up
pub const MAX_POLL_ATTEMPTS: u32 = 30;

/// Delay between execution status polls in seconds
pub const POLL_INTERVAL_SECS: u64 = 2;

/// Scheduling sent when the caller does not provide one. The remote rejects
/// scenario creation without a scheduling value.
pub fn default_scheduling() -> Value {
    json!({"type": "indefinitely"})
}

/// A blueprint argument: either a JSON tree or its string form.
#[derive(Debug, Clone)]
pub enum BlueprintInput<'a> {
    Tree(&'a Value),
    Json(&'a str),
}

impl<'a> From<&'a Value> for BlueprintInput<'a> {
    fn from(value: &'a Value) -> Self {
        BlueprintInput::Tree(value)
    }
}

impl<'a> From<&'a str> for BlueprintInput<'a> {
    fn from(raw: &'a str) -> Self {
        BlueprintInput::Json(raw)
    }
}

impl BlueprintInput<'_> {
    pub(crate) fn into_tree(self) -> MakeResult<Value> {
        match self {
            BlueprintInput::Tree(value) => Ok(value.clone()),
            BlueprintInput::Json(raw) => parse_blueprint(raw),
        }
    }
}

/// Optional arguments for scenario creation.
#[derive(Debug, Clone, Default)]
pub struct CreateScenarioOptions {
    /// Override name; defaults to the blueprint's own `name`
    pub name: Option<String>,
    pub folder_id: Option<i64>,
    /// Scheduling configuration; defaults to `{"type": "indefinitely"}`
    pub scheduling: Option<Value>,
    /// Create under a different team than the configured scope
    pub target_team_id: Option<i64>,
}

impl CreateScenarioOptions {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn folder_id(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn scheduling(mut self, scheduling: Value) -> Self {
        self.scheduling = Some(scheduling);
        self
    }

    pub fn target_team_id(mut self, team_id: i64) -> Self {
        self.target_team_id = Some(team_id);
        self
    }
}

impl MakeClient {
    /// List scenarios in the configured scope, in remote order.
    pub async fn list_scenarios(&self, active_only: bool) -> MakeResult<Vec<Scenario>> {
        let mut params = self.config().default_params();
        if active_only {
            params.push(("isActive", "true".to_string()));
        }

        let response = self
            .request(Method::GET, "/scenarios", None, &params)
            .await?;
        let scenarios: Vec<Scenario> =
            serde_json::from_value(response.get("scenarios").cloned().unwrap_or(json!([])))?;

        log::info!("Retrieved {} scenarios", scenarios.len());
        Ok(scenarios)
    }

    /// Fetch a scenario's blueprint. A missing scenario surfaces as
    /// `MakeError::Api` with status 404.
    pub async fn get_scenario_blueprint(&self, scenario_id: i64) -> MakeResult<Value> {
        let path = format!("/scenarios/{}/blueprint", scenario_id);
        let response = self.request(Method::GET, &path, None, &[]).await?;

        log::info!("Retrieved blueprint for scenario {}", scenario_id);
        Ok(response.get("response").cloned().unwrap_or(response))
    }

    /// Create a scenario from a blueprint. The new scenario starts inactive.
    pub async fn create_scenario<'a>(
        &self,
        blueprint: impl Into<BlueprintInput<'a>>,
        options: CreateScenarioOptions,
    ) -> MakeResult<Scenario> {
        let blueprint = blueprint.into().into_tree()?;
        validate_blueprint(&blueprint)?;

        let payload = build_create_scenario_payload(
            &blueprint,
            &options,
            &self.config().default_params(),
        );
        let response = self
            .request(Method::POST, "/scenarios", Some(&payload), &[])
            .await?;
        let scenario = extract_scenario(response)?;

        log::info!("Created scenario '{}' (ID: {})", scenario.name, scenario.id);
        Ok(scenario)
    }

    /// Clone an existing scenario under a new name.
    ///
    /// Connection/webhook mappings are a best-effort flat substitution on the
    /// known module key paths; templates with hardcoded hook ids should go
    /// through `create_scenario_with_new_hooks` instead.
    pub async fn clone_scenario(
        &self,
        source_scenario_id: i64,
        new_name: &str,
        target_team_id: Option<i64>,
        connection_mapping: Option<&HashMap<i64, i64>>,
        webhook_mapping: Option<&HashMap<i64, i64>>,
    ) -> MakeResult<Scenario> {
        let mut blueprint = self.get_scenario_blueprint(source_scenario_id).await?;
        if let Some(obj) = blueprint.as_object_mut() {
            obj.insert("name".to_string(), json!(new_name));
        }

        if connection_mapping.is_some() || webhook_mapping.is_some() {
            blueprint = apply_id_mappings(
                &blueprint,
                connection_mapping.unwrap_or(&HashMap::new()),
                webhook_mapping.unwrap_or(&HashMap::new()),
            );
        }

        let mut options = CreateScenarioOptions::default().name(new_name);
        if let Some(team_id) = target_team_id {
            options = options.target_team_id(team_id);
        }
        let cloned = self.create_scenario(&blueprint, options).await?;

        log::info!(
            "Cloned scenario {} to {}",
            source_scenario_id,
            cloned.id
        );
        Ok(cloned)
    }

    /// Replace a scenario's blueprint (and optionally its scheduling).
    pub async fn update_scenario_blueprint<'a>(
        &self,
        scenario_id: i64,
        blueprint: impl Into<BlueprintInput<'a>>,
        scheduling: Option<Value>,
    ) -> MakeResult<Scenario> {
        let blueprint = blueprint.into().into_tree()?;
        validate_blueprint(&blueprint)?;

        let mut payload = Map::new();
        payload.insert(
            "blueprint".to_string(),
            json!(format_blueprint_for_api(&blueprint)),
        );
        if let Some(scheduling) = scheduling {
            payload.insert("scheduling".to_string(), json!(scheduling.to_string()));
        }

        let path = format!("/scenarios/{}", scenario_id);
        let response = self
            .request(Method::PATCH, &path, Some(&Value::Object(payload)), &[])
            .await?;
        let scenario = extract_scenario(response)?;

        log::info!("Updated scenario {}", scenario_id);
        Ok(scenario)
    }

    /// Activate a scenario. Idempotent: activating an active scenario is not
    /// an error.
    pub async fn activate_scenario(&self, scenario_id: i64) -> MakeResult<Value> {
        self.set_scenario_active(scenario_id, true).await
    }

    /// Deactivate a scenario. Idempotent.
    pub async fn deactivate_scenario(&self, scenario_id: i64) -> MakeResult<Value> {
        self.set_scenario_active(scenario_id, false).await
    }

    async fn set_scenario_active(&self, scenario_id: i64, active: bool) -> MakeResult<Value> {
        let path = format!("/scenarios/{}", scenario_id);
        let body = json!({"isActive": active});
        let response = self.request(Method::PATCH, &path, Some(&body), &[]).await?;

        log::info!(
            "{} scenario {}",
            if active { "Activated" } else { "Deactivated" },
            scenario_id
        );
        Ok(response)
    }

    /// Trigger a manual execution.
    ///
    /// With `wait_for_completion` the execution status is polled every
    /// [`POLL_INTERVAL_SECS`] seconds, at most [`MAX_POLL_ATTEMPTS`] times;
    /// exhaustion fails with `MakeError::ExecutionTimeout`. Without waiting
    /// the initial acknowledgement is returned as-is.
    ///
    /// When the acknowledgement carries no execution id there is nothing to
    /// poll, and the ack is returned even if waiting was requested. Callers
    /// that must have a final record should check
    /// [`Execution::is_terminal`] on the result.
    pub async fn run_scenario(
        &self,
        scenario_id: i64,
        input_data: Option<Value>,
        wait_for_completion: bool,
    ) -> MakeResult<Execution> {
        let body = match input_data {
            Some(data) => json!({"data": data}),
            None => json!({}),
        };
        let path = format!("/scenarios/{}/run", scenario_id);
        let response = self.request(Method::POST, &path, Some(&body), &[]).await?;
        let ack = Execution::from_response(response);

        log::info!("Started execution of scenario {}", scenario_id);

        if !wait_for_completion {
            return Ok(ack);
        }

        let Some(execution_id) = ack.execution_id.clone() else {
            log::warn!(
                "Run acknowledgement for scenario {} carried no execution id; not polling",
                scenario_id
            );
            return Ok(ack);
        };

        self.poll_execution(
            scenario_id,
            &execution_id,
            MAX_POLL_ATTEMPTS,
            std::time::Duration::from_secs(POLL_INTERVAL_SECS),
        )
        .await
    }

    pub(crate) async fn poll_execution(
        &self,
        scenario_id: i64,
        execution_id: &str,
        max_attempts: u32,
        interval: std::time::Duration,
    ) -> MakeResult<Execution> {
        let path = format!("/scenarios/{}/executions/{}", scenario_id, execution_id);

        for attempt in 1..=max_attempts {
            let response = self.request(Method::GET, &path, None, &[]).await?;
            let record = response
                .get("execution")
                .or_else(|| response.get("scenarioExecution"))
                .cloned()
                .unwrap_or(response);
            let execution = Execution::from_response(record);

            if execution.is_terminal() {
                log::info!(
                    "Execution {} reached '{}' after {} polls",
                    execution_id,
                    execution.status.as_deref().unwrap_or("unknown"),
                    attempt
                );
                return Ok(execution);
            }

            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(MakeError::ExecutionTimeout {
            attempts: max_attempts,
        })
    }

    /// Delete a scenario. Not reversible.
    pub async fn delete_scenario(&self, scenario_id: i64) -> MakeResult<Value> {
        let path = format!("/scenarios/{}", scenario_id);
        let response = self.request(Method::DELETE, &path, None, &[]).await?;

        log::info!("Deleted scenario {}", scenario_id);
        Ok(response)
    }
}

/// Assemble the scenario creation payload. The blueprint travels as a compact
/// JSON string, as does the scheduling value; the scope id rides in the body.
fn build_create_scenario_payload(
    blueprint: &Value,
    options: &CreateScenarioOptions,
    default_params: &[(&'static str, String)],
) -> Value {
    let name = options
        .name
        .clone()
        .or_else(|| {
            blueprint
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Untitled Scenario".to_string());

    let mut payload = Map::new();
    payload.insert(
        "blueprint".to_string(),
        json!(format_blueprint_for_api(blueprint)),
    );
    payload.insert("name".to_string(), json!(name));

    match options.target_team_id {
        Some(team_id) => {
            payload.insert("teamId".to_string(), json!(team_id.to_string()));
        }
        None => {
            for (key, value) in default_params {
                payload.insert((*key).to_string(), json!(value));
            }
        }
    }

    if let Some(folder_id) = options.folder_id {
        payload.insert("folderId".to_string(), json!(folder_id));
    }

    let scheduling = options
        .scheduling
        .clone()
        .unwrap_or_else(default_scheduling);
    payload.insert("scheduling".to_string(), json!(scheduling.to_string()));

    Value::Object(payload)
}

/// Best-effort id substitution for cloning: rewrites connection references
/// (`__IMTCONN__` in a module's parameters) and webhook references
/// (`parameters.hook`, `webhook.id`) across flow modules. Unlike the full
/// substitution engine this never mints new resources.
fn apply_id_mappings(
    blueprint: &Value,
    connection_mapping: &HashMap<i64, i64>,
    webhook_mapping: &HashMap<i64, i64>,
) -> Value {
    let mut rewritten = blueprint.clone();

    let Some(flow) = rewritten.get_mut("flow").and_then(Value::as_array_mut) else {
        return rewritten;
    };

    for module in flow {
        if let Some(parameters) = module.get_mut("parameters").and_then(Value::as_object_mut) {
            remap_int_key(parameters, "__IMTCONN__", connection_mapping);
            remap_int_key(parameters, "hook", webhook_mapping);
        }
        if let Some(webhook) = module.get_mut("webhook").and_then(Value::as_object_mut) {
            remap_int_key(webhook, "id", webhook_mapping);
        }
    }

    rewritten
}

fn remap_int_key(obj: &mut Map<String, Value>, key: &str, mapping: &HashMap<i64, i64>) {
    if let Some(old_id) = obj.get(key).and_then(Value::as_i64) {
        if let Some(new_id) = mapping.get(&old_id) {
            obj.insert(key.to_string(), json!(new_id));
        }
    }
}

fn extract_scenario(response: Value) -> MakeResult<Scenario> {
    let data = response.get("scenario").cloned().unwrap_or(response);
    Ok(serde_json::from_value(data)?)
}
