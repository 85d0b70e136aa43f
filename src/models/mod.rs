// Remote resource models for the Make.com API

pub mod hook;
pub mod scenario;
pub mod team;

pub use hook::{CreatedWebhook, Hook, HookReplacement, ScenarioWithHooks, WebhookOptions};
pub use scenario::{Execution, Scenario};
pub use team::{AuthUser, Organization, Team};
