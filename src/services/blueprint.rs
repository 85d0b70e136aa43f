// Blueprint Builder
//
// Pure construction, validation, and formatting of blueprint JSON trees.
// No I/O here; everything network-facing lives in the scenario and hook
// services.

use serde_json::{json, Value};

use crate::error::{MakeError, MakeResult};

/// Build a minimal valid blueprint.
///
/// When `modules` is `None` a single default HTTP-action module is inserted
/// as a placeholder pipeline. Deterministic: identical arguments produce
/// structurally identical output.
pub fn create_simple_blueprint(
    name: &str,
    description: &str,
    modules: Option<Vec<Value>>,
) -> Value {
    let modules = modules.unwrap_or_else(|| vec![default_http_module(1, 0)]);

    json!({
        "name": name,
        "description": description,
        "flow": modules,
        "metadata": {
            "version": 1,
            "scenario": {
                "roundtrips": 1,
                "maxErrors": 3,
                "autoCommit": true,
                "autoCommitTriggerLast": true,
                "sequential": false,
                "confidential": false,
                "dataloss": false,
                "dlq": false,
                "freshVariables": false
            },
            "designer": {"orphans": []}
        }
    })
}

/// Build a blueprint whose first module is a webhook trigger.
///
/// The trigger carries `webhook_name` as metadata only; the hook id is
/// assigned when the webhook is provisioned remotely (or substituted by the
/// hook replacement engine for templates with hardcoded ids).
pub fn create_webhook_blueprint(name: &str, webhook_name: &str, description: &str) -> Value {
    let modules = vec![
        json!({
            "id": 1,
            "module": "webhook:CustomWebHook",
            "version": 1,
            "metadata": {"designer": {"x": 0, "y": 0}},
            "webhook": {"name": webhook_name, "type": "incoming"}
        }),
        default_http_module(2, 300),
    ];

    create_simple_blueprint(name, description, Some(modules))
}

fn default_http_module(id: i64, x: i64) -> Value {
    json!({
        "id": id,
        "module": "http:ActionSendData",
        "version": 3,
        "metadata": {"designer": {"x": x, "y": 0}},
        "mapper": {
            "url": "https://httpbin.org/post",
            "method": "post",
            "headers": [],
            "qs": [],
            "body": "{\"message\": \"Hello from Make.com!\"}"
        }
    })
}

/// Serialize a blueprint to the compact JSON string the API expects.
pub fn format_blueprint_for_api(blueprint: &Value) -> String {
    blueprint.to_string()
}

/// Parse a blueprint JSON string.
pub fn parse_blueprint(raw: &str) -> MakeResult<Value> {
    serde_json::from_str(raw).map_err(|e| MakeError::Validation {
        message: format!("Blueprint is not valid JSON: {}", e),
    })
}

/// Client-side structural validation, applied before any request is sent.
///
/// Checks the required top-level shape: object with a non-empty `name` and a
/// `flow` array whose entries each carry an integer `id` and a string
/// `module` identifier.
pub fn validate_blueprint(blueprint: &Value) -> MakeResult<()> {
    let obj = blueprint.as_object().ok_or_else(|| MakeError::Validation {
        message: "Blueprint must be a JSON object".to_string(),
    })?;

    match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => {}
        _ => {
            return Err(MakeError::Validation {
                message: "Blueprint requires a non-empty 'name'".to_string(),
            })
        }
    }

    let flow = obj
        .get("flow")
        .and_then(Value::as_array)
        .ok_or_else(|| MakeError::Validation {
            message: "Blueprint requires a 'flow' array".to_string(),
        })?;

    for (index, module) in flow.iter().enumerate() {
        let module_obj = module.as_object().ok_or_else(|| MakeError::Validation {
            message: format!("flow[{}] must be an object", index),
        })?;
        if !module_obj.get("id").map(Value::is_i64).unwrap_or(false) {
            return Err(MakeError::Validation {
                message: format!("flow[{}] requires an integer 'id'", index),
            });
        }
        if !module_obj.get("module").map(Value::is_string).unwrap_or(false) {
            return Err(MakeError::Validation {
                message: format!("flow[{}] requires a string 'module' identifier", index),
            });
        }
    }

    Ok(())
}
