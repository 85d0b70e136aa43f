// Hook Management and Substitution
//
// Webhook CRUD plus the hook substitution engine: blueprints exported as
// templates often embed the integer id of a hook that is already bound to
// another scenario (the platform allows one scenario per hook). The engine
// discovers those ids with a recursive scan, mints replacement webhooks, and
// rewrites the blueprint before deployment.

use std::collections::{BTreeSet, HashMap};

use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::client::MakeClient;
use crate::error::{MakeError, MakeResult};
use crate::models::{CreatedWebhook, Hook, HookReplacement, ScenarioWithHooks, WebhookOptions};
use crate::services::scenarios::{BlueprintInput, CreateScenarioOptions};

/// Name prefix for webhooks minted during substitution
pub const DEFAULT_WEBHOOK_NAME_PREFIX: &str = "Auto-created Webhook";

/// Collect every hardcoded hook id in a blueprint.
///
/// A hook reference is an integer reachable as the value of a `hook` key
/// (including inside a module's `parameters`) or as the `id` of a `webhook`
/// object. Module `id`, `version`, and designer coordinates never match.
pub fn find_hardcoded_hooks(blueprint: &Value) -> BTreeSet<i64> {
    let mut hooks = BTreeSet::new();
    collect_hook_ids(blueprint, &mut hooks);
    hooks
}

fn collect_hook_ids(node: &Value, hooks: &mut BTreeSet<i64>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("hook", Value::Number(n)) => {
                        if let Some(id) = n.as_i64() {
                            hooks.insert(id);
                        }
                    }
                    ("webhook", Value::Object(webhook)) => {
                        if let Some(id) = webhook.get("id").and_then(Value::as_i64) {
                            hooks.insert(id);
                        }
                        collect_hook_ids(value, hooks);
                    }
                    _ => collect_hook_ids(value, hooks),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_hook_ids(item, hooks);
            }
        }
        _ => {}
    }
}

/// Rewrite every mapped hook id in a blueprint, at the same key paths the
/// discovery scan matches. Returns a new tree; the input is never mutated.
/// Unmapped ids and all non-hook values are carried over unchanged, so the
/// result is a pure function of `(blueprint, mapping)`.
pub fn rewrite_hook_ids(blueprint: &Value, mapping: &HashMap<i64, i64>) -> Value {
    match blueprint {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let rewritten = match (key.as_str(), value) {
                    ("hook", Value::Number(_)) => remap_number(value, mapping),
                    ("webhook", Value::Object(webhook)) => rewrite_webhook_object(webhook, mapping),
                    _ => rewrite_hook_ids(value, mapping),
                };
                out.insert(key.clone(), rewritten);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rewrite_hook_ids(item, mapping))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn rewrite_webhook_object(webhook: &Map<String, Value>, mapping: &HashMap<i64, i64>) -> Value {
    let mut out = Map::with_capacity(webhook.len());
    for (key, value) in webhook {
        let rewritten = match (key.as_str(), value) {
            ("id", Value::Number(_)) => remap_number(value, mapping),
            // `hook` keys inside a webhook object are discovered by the
            // scan, so the rewrite must cover them too.
            ("hook", Value::Number(_)) => remap_number(value, mapping),
            _ => rewrite_hook_ids(value, mapping),
        };
        out.insert(key.clone(), rewritten);
    }
    Value::Object(out)
}

fn remap_number(value: &Value, mapping: &HashMap<i64, i64>) -> Value {
    match value.as_i64().and_then(|id| mapping.get(&id)) {
        Some(new_id) => json!(new_id),
        None => value.clone(),
    }
}

/// Assemble the webhook creation body. The header-inclusion flag must be the
/// plural `headers`; the remote rejects the singular form with a 400.
fn build_webhook_payload(
    options: &WebhookOptions,
    default_params: &[(&'static str, String)],
) -> Value {
    let mut payload = Map::new();
    payload.insert("name".to_string(), json!(options.name));
    for (key, value) in default_params {
        payload.insert((*key).to_string(), json!(value));
    }
    payload.insert("typeName".to_string(), json!(options.type_name));
    payload.insert("method".to_string(), json!(options.method));
    payload.insert("headers".to_string(), json!(options.headers));
    payload.insert("stringify".to_string(), json!(options.stringify));
    if let Some(connection_id) = options.connection_id {
        payload.insert("__IMTCONN__".to_string(), json!(connection_id));
    }
    if let Some(form_id) = &options.form_id {
        payload.insert("formId".to_string(), json!(form_id));
    }
    Value::Object(payload)
}

impl MakeClient {
    /// List hooks in the configured scope, with optional server-side filters.
    pub async fn list_hooks(
        &self,
        type_name: Option<&str>,
        assigned: Option<bool>,
        view_for_scenario_id: Option<i64>,
    ) -> MakeResult<Vec<Hook>> {
        let mut params = self.config().default_params();
        if let Some(type_name) = type_name {
            params.push(("typeName", type_name.to_string()));
        }
        if let Some(assigned) = assigned {
            params.push(("assigned", assigned.to_string()));
        }
        if let Some(scenario_id) = view_for_scenario_id {
            params.push(("viewForScenarioId", scenario_id.to_string()));
        }

        let response = self.request(Method::GET, "/hooks", None, &params).await?;
        let hooks: Vec<Hook> =
            serde_json::from_value(response.get("hooks").cloned().unwrap_or(json!([])))?;

        log::info!("Retrieved {} hooks", hooks.len());
        Ok(hooks)
    }

    /// Create a webhook. The remote assigns the id and inbound URL.
    pub async fn create_webhook(&self, options: WebhookOptions) -> MakeResult<Hook> {
        let payload = build_webhook_payload(&options, &self.config().default_params());
        let response = self
            .request(Method::POST, "/hooks", Some(&payload), &[])
            .await?;
        let hook = extract_hook(response)?;

        log::info!(
            "Created webhook '{}' (ID: {}, URL: {})",
            hook.name,
            hook.id,
            hook.url.as_deref().unwrap_or("-")
        );
        Ok(hook)
    }

    /// Fetch a single hook.
    pub async fn get_hook_details(&self, hook_id: i64) -> MakeResult<Hook> {
        let path = format!("/hooks/{}", hook_id);
        let response = self.request(Method::GET, &path, None, &[]).await?;
        extract_hook(response)
    }

    /// Rename a hook.
    pub async fn update_hook(&self, hook_id: i64, name: &str) -> MakeResult<Hook> {
        let path = format!("/hooks/{}", hook_id);
        let body = json!({"name": name});
        let response = self.request(Method::PATCH, &path, Some(&body), &[]).await?;
        let hook = extract_hook(response)?;

        log::info!("Updated hook {} name to '{}'", hook_id, name);
        Ok(hook)
    }

    /// Delete a hook. Deleting a hook that is assigned to a scenario fails
    /// unless `confirmed` is set; the failure satisfies
    /// [`MakeError::is_hook_conflict`].
    pub async fn delete_hook(&self, hook_id: i64, confirmed: bool) -> MakeResult<Value> {
        let path = format!("/hooks/{}", hook_id);
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if confirmed {
            params.push(("confirmed", "true".to_string()));
        }
        let response = self.request(Method::DELETE, &path, None, &params).await?;

        log::info!("Deleted hook {}", hook_id);
        Ok(response)
    }

    /// Replace hardcoded hook ids in a blueprint.
    ///
    /// Discovered ids missing from `hook_mapping` get a freshly created
    /// webhook (one per distinct id) when `create_new_hooks` is set;
    /// otherwise they pass through unchanged. With a complete explicit
    /// mapping and `create_new_hooks: false` this performs no network I/O.
    pub async fn replace_hardcoded_hooks_in_blueprint(
        &self,
        blueprint: &Value,
        hook_mapping: Option<HashMap<i64, i64>>,
        create_new_hooks: bool,
        webhook_name_prefix: &str,
    ) -> MakeResult<HookReplacement> {
        let mut mapping = hook_mapping.unwrap_or_default();
        let discovered = find_hardcoded_hooks(blueprint);

        log::info!("Found {} hardcoded hook references", discovered.len());

        for old_id in &discovered {
            if mapping.contains_key(old_id) {
                continue;
            }
            if create_new_hooks {
                let name = format!("{} {}", webhook_name_prefix, old_id);
                let hook = self.create_webhook(WebhookOptions::new(name)).await?;
                log::info!(
                    "Created webhook {} to replace hardcoded hook {}",
                    hook.id,
                    old_id
                );
                mapping.insert(*old_id, hook.id);
            } else {
                log::warn!(
                    "No mapping for hardcoded hook {}; leaving it unchanged",
                    old_id
                );
            }
        }

        Ok(HookReplacement {
            blueprint: rewrite_hook_ids(blueprint, &mapping),
            mapping,
        })
    }

    /// Create a scenario from a blueprint, minting a new webhook for every
    /// hardcoded hook id it embeds. Returns the scenario together with the
    /// old-to-new mapping and the created hooks' URLs so the caller can wire
    /// the endpoints into an external system.
    pub async fn create_scenario_with_new_hooks<'a>(
        &self,
        blueprint: impl Into<BlueprintInput<'a>>,
        options: CreateScenarioOptions,
        webhook_name_prefix: &str,
    ) -> MakeResult<ScenarioWithHooks> {
        let tree = blueprint.into().into_tree()?;
        let replacement = self
            .replace_hardcoded_hooks_in_blueprint(&tree, None, true, webhook_name_prefix)
            .await?;

        let scenario = self
            .create_scenario(&replacement.blueprint, options)
            .await?;

        let mut webhooks = Vec::with_capacity(replacement.mapping.len());
        for (old_id, new_id) in &replacement.mapping {
            match self.get_hook_details(*new_id).await {
                Ok(hook) => webhooks.push(CreatedWebhook {
                    id: hook.id,
                    name: hook.name,
                    url: hook.url,
                    replaced_hook_id: *old_id,
                }),
                Err(e) => log::warn!("Could not fetch details for hook {}: {}", new_id, e),
            }
        }

        log::info!(
            "Created scenario '{}' (ID: {}) with {} replaced hooks",
            scenario.name,
            scenario.id,
            replacement.mapping.len()
        );
        Ok(ScenarioWithHooks {
            scenario,
            hook_mapping: replacement.mapping,
            webhooks,
        })
    }
}

fn extract_hook(response: Value) -> MakeResult<Hook> {
    let data = response.get("hook").cloned().unwrap_or(response);
    serde_json::from_value(data).map_err(MakeError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::blueprint::create_webhook_blueprint;

    fn template_blueprint() -> Value {
        json!({
            "name": "Template",
            "description": "",
            "flow": [
                {
                    "id": 1,
                    "module": "gateway:CustomWebHook",
                    "version": 1,
                    "metadata": {"designer": {"x": 0, "y": 0}},
                    "parameters": {"hook": 836593}
                },
                {
                    "id": 2,
                    "module": "webhook:CustomWebHook",
                    "version": 1,
                    "metadata": {"designer": {"x": 300, "y": 150}},
                    "webhook": {"id": 442211, "name": "Inbound"}
                },
                {
                    "id": 3,
                    "module": "http:ActionSendData",
                    "version": 3,
                    "metadata": {"designer": {"x": 600, "y": 0}},
                    "mapper": {"nested": [{"hook": 836593}]}
                }
            ]
        })
    }

    #[test]
    fn test_find_hooks_empty_for_plain_blueprint() {
        let bp = crate::services::blueprint::create_simple_blueprint("Plain", "", None);
        assert!(find_hardcoded_hooks(&bp).is_empty());
    }

    #[test]
    fn test_find_hooks_ignores_webhook_without_id() {
        // Builder webhook triggers carry only a name and type.
        let bp = create_webhook_blueprint("Hooked", "My Webhook", "");
        assert!(find_hardcoded_hooks(&bp).is_empty());
    }

    #[test]
    fn test_find_hooks_collects_distinct_ids() {
        let found = find_hardcoded_hooks(&template_blueprint());
        assert_eq!(found, BTreeSet::from([442211, 836593]));
    }

    #[test]
    fn test_find_hooks_skips_module_metadata_integers() {
        let found = find_hardcoded_hooks(&template_blueprint());
        // Module ids, versions, and designer coordinates must not leak in.
        for non_hook in [1, 2, 3, 150, 300, 600] {
            assert!(!found.contains(&non_hook));
        }
    }

    #[test]
    fn test_rewrite_replaces_every_occurrence() {
        let bp = template_blueprint();
        let mapping = HashMap::from([(836593, 999999), (442211, 888888)]);

        let rewritten = rewrite_hook_ids(&bp, &mapping);
        assert_eq!(rewritten["flow"][0]["parameters"]["hook"], 999999);
        assert_eq!(rewritten["flow"][1]["webhook"]["id"], 888888);
        assert_eq!(rewritten["flow"][2]["mapper"]["nested"][0]["hook"], 999999);
    }

    #[test]
    fn test_rewrite_leaves_other_values_untouched() {
        let bp = template_blueprint();
        let mapping = HashMap::from([(836593, 999999)]);

        let rewritten = rewrite_hook_ids(&bp, &mapping);
        assert_eq!(rewritten["flow"][0]["id"], 1);
        assert_eq!(rewritten["flow"][0]["version"], 1);
        assert_eq!(rewritten["flow"][1]["metadata"]["designer"]["y"], 150);
        // Unmapped hook id passes through unchanged.
        assert_eq!(rewritten["flow"][1]["webhook"]["id"], 442211);
        assert_eq!(rewritten["name"], "Template");
    }

    #[test]
    fn test_rewrite_covers_hook_key_inside_webhook_object() {
        // Every id the scan discovers must be reachable by the rewrite,
        // including a `hook` key nested inside a webhook object.
        let bp = json!({
            "flow": [
                {"id": 1, "module": "webhook:CustomWebHook",
                 "webhook": {"id": 111, "hook": 836593}}
            ]
        });
        let discovered = find_hardcoded_hooks(&bp);
        assert_eq!(discovered, BTreeSet::from([111, 836593]));

        let mapping = HashMap::from([(836593, 999999), (111, 222)]);
        let rewritten = rewrite_hook_ids(&bp, &mapping);
        assert_eq!(rewritten["flow"][0]["webhook"]["id"], 222);
        assert_eq!(rewritten["flow"][0]["webhook"]["hook"], 999999);
        assert!(find_hardcoded_hooks(&rewritten).is_disjoint(&discovered));
    }

    #[test]
    fn test_rewrite_is_pure_and_repeatable() {
        let bp = template_blueprint();
        let mapping = HashMap::from([(836593, 999999)]);

        let first = rewrite_hook_ids(&bp, &mapping);
        let second = rewrite_hook_ids(&bp, &mapping);
        assert_eq!(first, second);
        // The input tree is never mutated.
        assert_eq!(bp, template_blueprint());
    }

    #[test]
    fn test_webhook_payload_uses_plural_headers_key() {
        let payload = build_webhook_payload(
            &WebhookOptions::new("Test Hook"),
            &[("teamId", "123".to_string())],
        );
        let obj = payload.as_object().unwrap();
        assert!(obj.contains_key("headers"));
        assert!(!obj.contains_key("header"));
        assert_eq!(payload["headers"], false);
        assert_eq!(payload["typeName"], "gateway-webhook");
        assert_eq!(payload["teamId"], "123");
    }

    #[test]
    fn test_webhook_payload_optional_fields() {
        let options = WebhookOptions::new("Form Hook")
            .connection_id(42)
            .form_id("form-1")
            .stringify(true);
        let payload = build_webhook_payload(&options, &[]);
        assert_eq!(payload["__IMTCONN__"], 42);
        assert_eq!(payload["formId"], "form-1");
        assert_eq!(payload["stringify"], true);
    }
}
