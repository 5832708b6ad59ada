//! Identity provider client (Google Identity Toolkit REST API).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{UpstreamError, decode_json, http_client, transport};

const SERVICE: &str = "identity provider";

/// A user account as known to the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a client-issued ID token and returns the account it belongs to.
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityUser, UpstreamError>;

    /// Looks an account up by email; `Ok(None)` when no account exists.
    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<IdentityUser>, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    api_base: String,
    project_id: Option<String>,
    service_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
}

impl From<LookupUser> for IdentityUser {
    fn from(user: LookupUser) -> Self {
        Self {
            uid: user.local_id,
            email: user.email,
        }
    }
}

impl IdentityToolkitClient {
    pub fn new(
        api_base: impl Into<String>,
        project_id: Option<String>,
        service_token: Option<String>,
    ) -> Self {
        Self {
            http: http_client(),
            api_base: api_base.into(),
            project_id,
            service_token,
        }
    }

    async fn lookup(&self, body: serde_json::Value) -> Result<LookupResponse, UpstreamError> {
        let (Some(project_id), Some(token)) = (&self.project_id, &self.service_token) else {
            return Err(UpstreamError::NotConfigured { service: SERVICE });
        };

        let url = format!(
            "{}/v1/projects/{}/accounts:lookup",
            self.api_base.trim_end_matches('/'),
            project_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport(SERVICE))?;

        decode_json(SERVICE, response).await
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityUser, UpstreamError> {
        self.lookup(json!({ "idToken": id_token }))
            .await?
            .users
            .into_iter()
            .next()
            .map(IdentityUser::from)
            .ok_or(UpstreamError::MalformedResponse {
                service: SERVICE,
                details: "token lookup returned no account".to_string(),
            })
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityUser>, UpstreamError> {
        let response = self.lookup(json!({ "email": [email] })).await?;
        Ok(response.users.into_iter().next().map(IdentityUser::from))
    }
}
