//! # Identity Gateway
//!
//! Admin sign-in. The identity provider owns credentials; this service only
//! admits accounts that exist there and map to a local admin record, then
//! issues its own session token. Every rejection looks the same to callers.

use std::sync::Arc;

use metrics::counter;
use sea_orm::DatabaseConnection;

use crate::auth::{SessionClaims, SessionKeys, SessionSubject};
use crate::integrations::IdentityProvider;
use crate::models::user::UserRole;
use crate::repositories::UserRepository;

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

#[derive(Clone)]
pub struct IdentityGateway {
    db: DatabaseConnection,
    provider: Arc<dyn IdentityProvider>,
    sessions: Arc<SessionKeys>,
}

impl IdentityGateway {
    pub fn new(
        db: DatabaseConnection,
        provider: Arc<dyn IdentityProvider>,
        sessions: Arc<SessionKeys>,
    ) -> Self {
        Self {
            db,
            provider,
            sessions,
        }
    }

    /// Returns `None` for any rejection, including provider and database failures.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        external_token: Option<&str>,
    ) -> Option<IssuedSession> {
        let outcome = self.try_authenticate(email, password, external_token).await;
        let label = if outcome.is_some() { "accepted" } else { "rejected" };
        counter!("admin_sign_in_total", "outcome" => label).increment(1);
        outcome
    }

    async fn try_authenticate(
        &self,
        email: &str,
        password: &str,
        external_token: Option<&str>,
    ) -> Option<IssuedSession> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return None;
        }

        if let Some(token) = external_token.filter(|t| !t.is_empty()) {
            match self.provider.verify_id_token(token).await {
                Ok(verified) => tracing::debug!(uid = %verified.uid, "Verified client identity token"),
                Err(err) => tracing::warn!(error = %err, "Client identity token verification failed"),
            }
        }

        let account = match self.provider.find_user_by_email(email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::info!("Sign-in rejected: no identity account");
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Sign-in rejected: identity lookup failed");
                return None;
            }
        };

        let user = match UserRepository::new(&self.db).find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::info!(uid = %account.uid, "Sign-in rejected: no local user");
                return None;
            }
            Err(err) => {
                tracing::error!(error = %err, "Sign-in rejected: user lookup failed");
                return None;
            }
        };

        if user.role != UserRole::Admin {
            tracing::info!(user_id = %user.id, role = user.role.as_str(), "Sign-in rejected: not an admin");
            return None;
        }

        let subject = SessionSubject {
            user_id: user.id,
            email: user.email.unwrap_or_else(|| email.to_string()),
            name: user.name,
            role: user.role,
            external_id: account.uid,
        };

        match self.sessions.issue(subject) {
            Ok((token, claims)) => {
                tracing::info!(user_id = %claims.sub, "Issued admin session");
                Some(IssuedSession { token, claims })
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to issue session");
                None
            }
        }
    }
}
