//! Make.com Blueprint Client
//!
//! Client library for the Make.com workflow-automation API: scenario CRUD,
//! webhook management, and blueprint templating with hardcoded-hook
//! substitution.
//!
//! ```no_run
//! use make_blueprint_client::{MakeClient, MakeConfig, CreateScenarioOptions};
//! use make_blueprint_client::services::blueprint::create_webhook_blueprint;
//!
//! # async fn run() -> Result<(), make_blueprint_client::MakeError> {
//! let config = MakeConfig::for_team("api-token", 123456)?;
//! let client = MakeClient::new(config)?;
//!
//! let blueprint = create_webhook_blueprint("Order intake", "Orders", "");
//! let created = client
//!     .create_scenario_with_new_hooks(&blueprint, CreateScenarioOptions::default(), "Orders")
//!     .await?;
//! client.activate_scenario(created.scenario.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use client::{MakeClient, REQUEST_TIMEOUT_SECS};
pub use config::{MakeConfig, DEFAULT_BASE_URL};
pub use error::{MakeError, MakeErrorCode, MakeResult};
pub use models::{
    CreatedWebhook, Execution, Hook, HookReplacement, Scenario, ScenarioWithHooks, WebhookOptions,
};
pub use services::{BlueprintInput, CreateScenarioOptions};
