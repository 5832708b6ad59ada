//! # Authentication and Authorization
//!
//! Signed session tokens for the admin portal and the extractors that guard
//! protected endpoints. Sessions are HS256 JWTs carried as
//! `Authorization: Bearer <token>`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized};
use crate::models::user::UserRole;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Local user id
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Identity-provider uid
    pub external_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// The identity a session is issued for
#[derive(Debug, Clone)]
pub struct SessionSubject {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub external_id: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret is not configured")]
    MissingSecret,
    #[error("failed to sign session token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("invalid session token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let secret = config
            .session_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or(SessionError::MissingSecret)?;
        Ok(Self::new(
            secret.as_bytes(),
            Duration::days(config.session_ttl_days),
        ))
    }

    /// Issues a token for `subject`, returning it with its claims.
    pub fn issue(&self, subject: SessionSubject) -> Result<(String, SessionClaims), SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.user_id,
            email: subject.email,
            name: subject.name,
            role: subject.role,
            external_id: subject.external_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Sign)?;
        Ok((token, claims))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(SessionError::Invalid)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

/// Any authenticated session
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

/// A session whose role is admin
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl<S> FromRequestParts<S> for Session
where
    Arc<SessionKeys>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = Arc::<SessionKeys>::from_ref(state);
        let token = bearer_token(&parts.headers)?;

        let claims = keys.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "Rejected session token");
            unauthorized(Some("Invalid or expired session"))
        })?;

        Ok(Session(claims))
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    Arc<SessionKeys>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Session(claims) = Session::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            tracing::info!(user_id = %claims.sub, role = claims.role.as_str(), "Denied non-admin session");
            return Err(forbidden(Some("Admin access required")));
        }
        Ok(AdminSession(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn keys() -> Arc<SessionKeys> {
        Arc::new(SessionKeys::new(&[7u8; 32], Duration::days(30)))
    }

    fn subject(role: UserRole) -> SessionSubject {
        SessionSubject {
            user_id: Uuid::new_v4(),
            email: "admin@turfy.io".to_string(),
            name: "Ada".to_string(),
            role,
            external_id: "uid-ada".to_string(),
        }
    }

    async fn call(keys: Arc<SessionKeys>, path: &str, token: Option<&str>) -> StatusCode {
        async fn any(Session(claims): Session) -> String {
            claims.email
        }
        async fn admin(AdminSession(claims): AdminSession) -> String {
            claims.email
        }

        let app = Router::new()
            .route("/any", get(any))
            .route("/admin", get(admin))
            .with_state(keys);

        let mut request = Request::builder().uri(path);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn issued_token_verifies_with_thirty_day_expiry() {
        let keys = keys();
        let (token, claims) = keys.issue(subject(UserRole::Admin)).unwrap();

        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
        assert_eq!(keys.verify(&token).unwrap(), claims);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = SessionKeys::new(&[9u8; 32], Duration::days(30));
        let (token, _) = other.issue(subject(UserRole::Admin)).unwrap();

        assert!(matches!(keys().verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn missing_secret_is_reported() {
        assert!(matches!(
            SessionKeys::from_config(&AppConfig::default()),
            Err(SessionError::MissingSecret)
        ));
    }

    #[tokio::test]
    async fn extractors_distinguish_unauthenticated_from_forbidden() {
        let keys = keys();
        let (admin_token, _) = keys.issue(subject(UserRole::Admin)).unwrap();
        let (owner_token, _) = keys.issue(subject(UserRole::VenueOwner)).unwrap();

        assert_eq!(call(keys.clone(), "/any", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(keys.clone(), "/any", Some("garbage")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(keys.clone(), "/any", Some(&owner_token)).await,
            StatusCode::OK
        );
        assert_eq!(
            call(keys.clone(), "/admin", Some(&owner_token)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(keys.clone(), "/admin", Some(&admin_token)).await,
            StatusCode::OK
        );
    }
}
