//! # Authentication API Handlers

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Session, SessionClaims};
use crate::error::{ApiError, unauthorized};
use crate::server::AppState;

/// Admin sign-in request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "admin@turfy.io")]
    pub email: String,
    pub password: String,
    /// ID token from the client-side identity provider sign-in, if any
    pub external_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Unix timestamp (seconds) at which the token expires
    pub expires_at: i64,
    pub user: SessionClaims,
}

/// Authenticate an admin and issue a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let session = state
        .identity
        .authenticate(
            &request.email,
            &request.password,
            request.external_token.as_deref(),
        )
        .await
        .ok_or_else(|| unauthorized(Some("Invalid email or password")))?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.claims.exp,
        user: session.claims,
    }))
}

/// Return the claims of the current session
#[utoipa::path(
    get,
    path = "/auth/session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionClaims),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn current_session(Session(claims): Session) -> Json<SessionClaims> {
    Json(claims)
}
