// Make.com API Configuration
//
// Holds credentials and the access scope (team or organization) for every
// request. All defaulting lives here so call sites never need to know the
// defaults.

use url::Url;

use crate::error::{MakeError, MakeResult};

/// Default API base URL (US region)
pub const DEFAULT_BASE_URL: &str = "https://us2.make.com/api/v2";

/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "MAKE_API_TOKEN";
/// Environment variable holding the team id
pub const ENV_TEAM_ID: &str = "MAKE_TEAM_ID";
/// Environment variable holding the organization id
pub const ENV_ORGANIZATION_ID: &str = "MAKE_ORGANIZATION_ID";
/// Environment variable overriding the API base URL
pub const ENV_BASE_URL: &str = "MAKE_API_BASE_URL";

/// Configuration for a Make.com API connection.
///
/// Exactly one of `team_id` / `organization_id` is set; the constructor
/// enforces this. Immutable after construction.
#[derive(Clone)]
pub struct MakeConfig {
    api_token: String,
    base_url: String,
    team_id: Option<i64>,
    organization_id: Option<i64>,
}

impl MakeConfig {
    /// Create a validated configuration.
    ///
    /// `base_url` falls back to [`DEFAULT_BASE_URL`] when `None`; a trailing
    /// slash is stripped.
    pub fn new(
        api_token: impl Into<String>,
        base_url: Option<String>,
        team_id: Option<i64>,
        organization_id: Option<i64>,
    ) -> MakeResult<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(MakeError::InvalidConfig {
                message: "API token is required and cannot be empty".to_string(),
            });
        }

        match (team_id, organization_id) {
            (None, None) => {
                return Err(MakeError::InvalidConfig {
                    message: "Either team_id or organization_id must be provided".to_string(),
                })
            }
            (Some(_), Some(_)) => {
                return Err(MakeError::InvalidConfig {
                    message: "Cannot specify both team_id and organization_id".to_string(),
                })
            }
            _ => {}
        }

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let parsed = Url::parse(&base_url).map_err(|e| MakeError::InvalidConfig {
            message: format!("Base URL is not a valid URL: {}", e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MakeError::InvalidConfig {
                message: "Base URL must start with http:// or https://".to_string(),
            });
        }

        Ok(Self {
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            team_id,
            organization_id,
        })
    }

    /// Shorthand for a team-scoped configuration on the default region.
    pub fn for_team(api_token: impl Into<String>, team_id: i64) -> MakeResult<Self> {
        Self::new(api_token, None, Some(team_id), None)
    }

    /// Shorthand for an organization-scoped configuration on the default region.
    pub fn for_organization(api_token: impl Into<String>, organization_id: i64) -> MakeResult<Self> {
        Self::new(api_token, None, None, Some(organization_id))
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> MakeResult<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Load configuration through an environment-lookup function.
    ///
    /// Taking the lookup as a parameter keeps this testable with a fake
    /// environment. Applies the same validation as [`MakeConfig::new`].
    pub fn from_env_with<F>(lookup: F) -> MakeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup(ENV_API_TOKEN).ok_or(MakeError::MissingEnv {
            name: ENV_API_TOKEN.to_string(),
        })?;

        let team_id = parse_env_id(ENV_TEAM_ID, lookup(ENV_TEAM_ID))?;
        let organization_id = parse_env_id(ENV_ORGANIZATION_ID, lookup(ENV_ORGANIZATION_ID))?;
        let base_url = lookup(ENV_BASE_URL);

        Self::new(api_token, base_url, team_id, organization_id)
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn team_id(&self) -> Option<i64> {
        self.team_id
    }

    pub fn organization_id(&self) -> Option<i64> {
        self.organization_id
    }

    /// True when scoped to a team.
    pub fn is_team_based(&self) -> bool {
        self.team_id.is_some()
    }

    /// True when scoped to an organization.
    pub fn is_organization_based(&self) -> bool {
        self.organization_id.is_some()
    }

    /// Default query parameter scoping every listing/creation request:
    /// `teamId` or `organizationId`, stringified.
    pub fn default_params(&self) -> Vec<(&'static str, String)> {
        if let Some(org_id) = self.organization_id {
            vec![("organizationId", org_id.to_string())]
        } else if let Some(team_id) = self.team_id {
            vec![("teamId", team_id.to_string())]
        } else {
            Vec::new()
        }
    }
}

fn parse_env_id(name: &str, value: Option<String>) -> MakeResult<Option<i64>> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| MakeError::InvalidConfig {
                message: format!("{} must be an integer, got '{}'", name, raw),
            }),
    }
}

// Token never appears in Debug output.
impl std::fmt::Debug for MakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Char-wise so a multi-byte token cannot split on a byte boundary.
        let token_preview = if self.api_token.chars().count() > 8 {
            format!("{}...", self.api_token.chars().take(8).collect::<String>())
        } else {
            "***".to_string()
        };
        f.debug_struct("MakeConfig")
            .field("base_url", &self.base_url)
            .field("team_id", &self.team_id)
            .field("organization_id", &self.organization_id)
            .field("api_token", &token_preview)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_config_is_valid() {
        let config = MakeConfig::for_team("test-token", 123456).unwrap();
        assert!(config.is_team_based());
        assert!(!config.is_organization_based());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            config.default_params(),
            vec![("teamId", "123456".to_string())]
        );
    }

    #[test]
    fn test_organization_config_is_valid() {
        let config = MakeConfig::for_organization("test-token", 789012).unwrap();
        assert!(config.is_organization_based());
        assert_eq!(
            config.default_params(),
            vec![("organizationId", "789012".to_string())]
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = MakeConfig::new("   ", None, Some(1), None).unwrap_err();
        assert!(err.to_string().contains("API token"));
    }

    #[test]
    fn test_neither_scope_rejected() {
        let err = MakeConfig::new("token", None, None, None).unwrap_err();
        assert!(err.to_string().contains("team_id or organization_id"));
    }

    #[test]
    fn test_both_scopes_rejected() {
        let err = MakeConfig::new("token", None, Some(1), Some(2)).unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_bad_scheme_rejected() {
        let err =
            MakeConfig::new("token", Some("ftp://make.com/api/v2".to_string()), Some(1), None)
                .unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = MakeConfig::new(
            "token",
            Some("https://eu1.make.com/api/v2/".to_string()),
            Some(1),
            None,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://eu1.make.com/api/v2");
    }

    #[test]
    fn test_from_env_with_fake_lookup() {
        let config = MakeConfig::from_env_with(|name| match name {
            ENV_API_TOKEN => Some("env-token".to_string()),
            ENV_TEAM_ID => Some("42".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.team_id(), Some(42));
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_env_missing_token() {
        let err = MakeConfig::from_env_with(|_| None).unwrap_err();
        assert!(matches!(err, MakeError::MissingEnv { ref name } if name == ENV_API_TOKEN));
    }

    #[test]
    fn test_from_env_both_scopes_rejected() {
        let err = MakeConfig::from_env_with(|name| match name {
            ENV_API_TOKEN => Some("env-token".to_string()),
            ENV_TEAM_ID => Some("1".to_string()),
            ENV_ORGANIZATION_ID => Some("2".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, MakeError::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_env_non_numeric_id() {
        let err = MakeConfig::from_env_with(|name| match name {
            ENV_API_TOKEN => Some("env-token".to_string()),
            ENV_TEAM_ID => Some("not-a-number".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = MakeConfig::for_team("super-secret-token-value", 1).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token-value"));
        assert!(debug.contains("super-se..."));
    }

    #[test]
    fn test_debug_handles_multibyte_token() {
        let config = MakeConfig::for_team("秘密のトークンの値です", 1).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("秘密のトークンの..."));
        assert!(!debug.contains("値です"));
    }
}
