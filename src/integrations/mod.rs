//! # External Service Integrations
//!
//! Trait seams for the identity provider, object storage and payment processor,
//! each with a reqwest-backed HTTP implementation. Callers decide whether an
//! [`UpstreamError`] aborts their operation or is logged and tolerated.

use std::time::Duration;

use reqwest::Response;
use thiserror::Error;

pub mod identity;
pub mod payments;
pub mod storage;

pub use identity::{IdentityProvider, IdentityToolkitClient, IdentityUser};
pub use payments::{ConnectedAccount, ConnectedAccountRequest, PaymentProcessor, StripeClient};
pub use storage::{CloudinaryStorage, ObjectStorage, StoredObject, UploadObject};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY: usize = 512;

/// Failure talking to an external service
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} response was malformed: {details}")]
    MalformedResponse {
        service: &'static str,
        details: String,
    },
}

impl UpstreamError {
    pub fn service(&self) -> &'static str {
        match self {
            UpstreamError::NotConfigured { service }
            | UpstreamError::Transport { service, .. }
            | UpstreamError::Status { service, .. }
            | UpstreamError::MalformedResponse { service, .. } => service,
        }
    }

    /// HTTP status returned by the service, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Turns a non-success response into [`UpstreamError::Status`], keeping a
/// truncated body for the log line.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(UpstreamError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, UpstreamError> {
    let response = ensure_success(service, response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| UpstreamError::MalformedResponse {
            service,
            details: err.to_string(),
        })
}

pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> UpstreamError {
    move |source| UpstreamError::Transport { service, source }
}
