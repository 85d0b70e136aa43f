// Account Discovery
//
// Helpers for finding the team and organization ids a configuration needs.

use reqwest::Method;
use serde_json::json;

use crate::client::MakeClient;
use crate::error::MakeResult;
use crate::models::{AuthUser, Organization, Team};

impl MakeClient {
    /// Fetch the authenticated user.
    pub async fn get_current_user(&self) -> MakeResult<AuthUser> {
        let response = self.request(Method::GET, "/users/me", None, &[]).await?;
        let data = response.get("authUser").cloned().unwrap_or(response);
        let user: AuthUser = serde_json::from_value(data)?;

        log::info!(
            "Retrieved user info for {}",
            user.name.as_deref().unwrap_or("unknown")
        );
        Ok(user)
    }

    /// List organizations the authenticated user belongs to.
    pub async fn list_organizations(&self) -> MakeResult<Vec<Organization>> {
        let response = self
            .request(Method::GET, "/organizations", None, &[])
            .await?;
        let organizations: Vec<Organization> = serde_json::from_value(
            response
                .get("organizations")
                .cloned()
                .unwrap_or(json!([])),
        )?;

        log::info!("Retrieved {} organizations", organizations.len());
        Ok(organizations)
    }

    /// List teams, optionally scoped to one organization.
    pub async fn list_teams(&self, organization_id: Option<i64>) -> MakeResult<Vec<Team>> {
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if let Some(org_id) = organization_id {
            params.push(("organizationId", org_id.to_string()));
        }

        let response = self.request(Method::GET, "/teams", None, &params).await?;
        let teams: Vec<Team> =
            serde_json::from_value(response.get("teams").cloned().unwrap_or(json!([])))?;

        log::info!("Retrieved {} teams", teams.len());
        Ok(teams)
    }
}
