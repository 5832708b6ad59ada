//! Object storage client (Cloudinary upload API).
//!
//! Requests are signed with SHA-256 over the alphabetically sorted parameters
//! followed by the API secret.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{UpstreamError, decode_json, http_client, transport};

const SERVICE: &str = "object storage";

/// A binary payload to store under `folder`
#[derive(Debug, Clone)]
pub struct UploadObject {
    pub folder: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where an object ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    /// Opaque key (`folder/name`) used to address the object later
    pub storage_key: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, object: UploadObject) -> Result<StoredObject, UpstreamError>;

    /// Moves an object to a new key and invalidates cached copies of the old one.
    async fn rename(&self, from_key: &str, to_key: &str) -> Result<StoredObject, UpstreamError>;
}

#[derive(Debug, Clone)]
struct Credentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryStorage {
    http: reqwest::Client,
    api_base: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    public_id: String,
    secure_url: String,
}

impl From<AssetResponse> for StoredObject {
    fn from(asset: AssetResponse) -> Self {
        Self {
            url: asset.secure_url,
            storage_key: asset.public_id,
        }
    }
}

impl CloudinaryStorage {
    pub fn new(
        api_base: impl Into<String>,
        cloud_name: Option<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Self {
        let credentials = match (cloud_name, api_key, api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(Credentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Self {
            http: http_client(),
            api_base: api_base.into(),
            credentials,
        }
    }

    fn credentials(&self) -> Result<&Credentials, UpstreamError> {
        self.credentials
            .as_ref()
            .ok_or(UpstreamError::NotConfigured { service: SERVICE })
    }

    fn endpoint(&self, credentials: &Credentials, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}",
            self.api_base.trim_end_matches('/'),
            credentials.cloud_name,
            action
        )
    }

    /// Adds `timestamp`, `api_key`, `signature` and `signature_algorithm` to `params`.
    fn sign(credentials: &Credentials, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = signature(&params, &credentials.api_secret);
        params.insert("api_key", credentials.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }
}

/// Hex SHA-256 of `k1=v1&k2=v2...` (keys sorted) immediately followed by the secret.
pub fn signature(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, object: UploadObject) -> Result<StoredObject, UpstreamError> {
        let credentials = self.credentials()?;
        let params = Self::sign(
            credentials,
            BTreeMap::from([("folder", object.folder.clone())]),
        );

        let mut file = Part::bytes(object.bytes).file_name(object.file_name);
        if let Some(content_type) = object.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .map_err(transport(SERVICE))?;
        }

        let mut form = Form::new().part("file", file);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .http
            .post(self.endpoint(credentials, "auto/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport(SERVICE))?;

        decode_json::<AssetResponse>(SERVICE, response)
            .await
            .map(StoredObject::from)
    }

    async fn rename(&self, from_key: &str, to_key: &str) -> Result<StoredObject, UpstreamError> {
        let credentials = self.credentials()?;
        let params = Self::sign(
            credentials,
            BTreeMap::from([
                ("from_public_id", from_key.to_string()),
                ("invalidate", "true".to_string()),
                ("to_public_id", to_key.to_string()),
            ]),
        );

        let response = self
            .http
            .post(self.endpoint(credentials, "image/rename"))
            .form(&params)
            .send()
            .await
            .map_err(transport(SERVICE))?;

        decode_json::<AssetResponse>(SERVICE, response)
            .await
            .map(StoredObject::from)
    }
}
