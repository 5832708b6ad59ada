//! # Payment Account Provisioning
//!
//! Creates the connected payment account a venue owner receives funds through.

use std::sync::Arc;

use metrics::counter;
use uuid::Uuid;

use crate::integrations::{ConnectedAccountRequest, PaymentProcessor, UpstreamError};

#[derive(Clone)]
pub struct PaymentAccountProvisioner {
    processor: Arc<dyn PaymentProcessor>,
}

impl PaymentAccountProvisioner {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { processor }
    }

    /// Returns the new account id. No onboarding link is created here.
    pub async fn provision(
        &self,
        venue_id: Uuid,
        owner_id: Uuid,
        venue_name: &str,
        owner_email: &str,
    ) -> Result<String, UpstreamError> {
        let request = ConnectedAccountRequest {
            email: owner_email.to_string(),
            company_name: venue_name.to_string(),
            venue_id,
            owner_id,
        };

        match self.processor.create_connected_account(&request).await {
            Ok(account) => {
                counter!("payment_accounts_created_total").increment(1);
                tracing::info!(%venue_id, %owner_id, account_id = %account.id, "Created connected payment account");
                Ok(account.id)
            }
            Err(err) => {
                counter!("payment_account_failures_total").increment(1);
                Err(err)
            }
        }
    }
}
