// Service modules: blueprint building plus the remote operations

pub mod account;
pub mod blueprint;
pub mod hooks;
pub mod scenarios;

pub use blueprint::{
    create_simple_blueprint, create_webhook_blueprint, format_blueprint_for_api, parse_blueprint,
    validate_blueprint,
};
pub use hooks::{find_hardcoded_hooks, rewrite_hook_ids, DEFAULT_WEBHOOK_NAME_PREFIX};
pub use scenarios::{
    default_scheduling, BlueprintInput, CreateScenarioOptions, MAX_POLL_ATTEMPTS,
    POLL_INTERVAL_SECS,
};
