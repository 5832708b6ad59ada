//! # Upload Handler
//!
//! Multipart image upload into the temporary namespace, or straight into a
//! venue's folder when `venueId` is supplied.

use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::error::{ApiError, bad_request, upstream_error};
use crate::media::{IncomingFile, MediaError};
use crate::server::AppState;

/// Multipart form accepted by `POST /upload`
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadForm {
    /// The image
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Store directly under this venue instead of the temporary namespace
    venue_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    /// Key to pass back as `images[].storageKey` when creating a venue
    pub storage_key: String,
}

impl From<MediaError> for ApiError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::Empty => bad_request("No file provided"),
            MediaError::TooLarge { .. } => ApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                &error.to_string(),
            ),
            MediaError::InvalidNamespace(_) => bad_request(&error.to_string()),
            MediaError::Upstream(err) => {
                tracing::error!(error = %err, "Media upload failed");
                upstream_error(err.service(), "upload failed")
            }
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(status, "PAYLOAD_TOO_LARGE", &err.body_text())
    } else {
        bad_request(&err.body_text())
    }
}

/// Upload an image
#[utoipa::path(
    post,
    path = "/upload",
    security(("bearer_auth" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or invalid venueId", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError),
        (status = 413, description = "File too large", body = ApiError),
        (status = 502, description = "Object storage failed", body = ApiError)
    ),
    tag = "media"
)]
pub async fn upload(
    State(state): State<AppState>,
    _admin: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|err| bad_request(&err.body_text()))?;

    let mut file = None;
    let mut venue_id = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(IncomingFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("venueId") => {
                let raw = field.text().await.map_err(multipart_error)?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let id = Uuid::parse_str(raw)
                        .map_err(|_| bad_request("venueId must be a UUID"))?;
                    venue_id = Some(id);
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or(MediaError::Empty)?;
    let namespace = venue_id.map(|id| id.to_string());

    let stored = state.media.upload(file, namespace.as_deref()).await?;

    Ok(Json(UploadResponse {
        url: stored.url,
        storage_key: stored.storage_key,
    }))
}
