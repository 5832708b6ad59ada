//! Payment processor client (Stripe Connect accounts API).

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::{UpstreamError, decode_json, http_client, transport};

const SERVICE: &str = "payment processor";

/// Parameters for a standard connected account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedAccountRequest {
    pub email: String,
    pub company_name: String,
    pub venue_id: Uuid,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Creates the account only; onboarding links are short-lived and minted on demand elsewhere.
    async fn create_connected_account(
        &self,
        request: &ConnectedAccountRequest,
    ) -> Result<ConnectedAccount, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
}

impl StripeClient {
    pub fn new(api_base: impl Into<String>, secret_key: Option<String>) -> Self {
        Self {
            http: http_client(),
            api_base: api_base.into(),
            secret_key,
        }
    }
}

/// Form fields for `POST /v1/accounts`, using the processor's bracketed nesting.
pub fn account_form(request: &ConnectedAccountRequest) -> Vec<(&'static str, String)> {
    vec![
        ("type", "standard".to_string()),
        ("email", request.email.clone()),
        ("business_type", "company".to_string()),
        ("company[name]", request.company_name.clone()),
        ("metadata[venueId]", request.venue_id.to_string()),
        ("metadata[ownerId]", request.owner_id.to_string()),
        ("capabilities[card_payments][requested]", "true".to_string()),
        ("capabilities[transfers][requested]", "true".to_string()),
    ]
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_connected_account(
        &self,
        request: &ConnectedAccountRequest,
    ) -> Result<ConnectedAccount, UpstreamError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured { service: SERVICE })?;

        let url = format!("{}/v1/accounts", self.api_base.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(secret_key)
            .form(&account_form(request))
            .send()
            .await
            .map_err(transport(SERVICE))?;

        decode_json(SERVICE, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_tags_account_with_venue_and_owner() {
        let venue_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let form = account_form(&ConnectedAccountRequest {
            email: "owner@turfy.io".to_string(),
            company_name: "Pitch A".to_string(),
            venue_id,
            owner_id,
        });

        assert!(form.contains(&("type", "standard".to_string())));
        assert!(form.contains(&("metadata[venueId]", venue_id.to_string())));
        assert!(form.contains(&("metadata[ownerId]", owner_id.to_string())));
        assert!(form.contains(&("company[name]", "Pitch A".to_string())));
    }
}
