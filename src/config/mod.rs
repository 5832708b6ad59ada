//! Configuration loading for the Turfy admin API.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `TURFY_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "TURFY_";
const REDACTED: &str = "[REDACTED]";
const MIN_SESSION_SECRET_LEN: usize = 32;

/// Application configuration derived from `TURFY_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// HMAC secret used to sign session tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    #[serde(default = "default_identity_api_base")]
    pub identity_api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_service_token: Option<String>,
    #[serde(default = "default_storage_api_base")]
    pub storage_api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_cloud_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_api_secret: Option<String>,
    #[serde(default = "default_payments_api_base")]
    pub payments_api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments_secret_key: Option<String>,
    #[serde(default = "default_upload_max_bytes")]
    pub upload_max_bytes: usize,
    #[serde(default = "default_seed_reference_data")]
    pub seed_reference_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            session_secret: None,
            session_ttl_days: default_session_ttl_days(),
            identity_api_base: default_identity_api_base(),
            identity_project_id: None,
            identity_service_token: None,
            storage_api_base: default_storage_api_base(),
            storage_cloud_name: None,
            storage_api_key: None,
            storage_api_secret: None,
            payments_api_base: default_payments_api_base(),
            payments_secret_key: None,
            upload_max_bytes: default_upload_max_bytes(),
            seed_reference_data: default_seed_reference_data(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Local and test profiles may run without external integration credentials.
    pub fn is_development_profile(&self) -> bool {
        matches!(self.profile.as_str(), "local" | "test")
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        for secret in [
            &mut config.session_secret,
            &mut config.identity_service_token,
            &mut config.storage_api_key,
            &mut config.storage_api_secret,
            &mut config.payments_secret_key,
        ] {
            if secret.is_some() {
                *secret = Some(REDACTED.to_string());
            }
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.session_secret.as_deref() {
            None | Some("") => return Err(ConfigError::MissingSessionSecret),
            Some(secret) if secret.len() < MIN_SESSION_SECRET_LEN => {
                return Err(ConfigError::SessionSecretTooShort {
                    length: secret.len(),
                });
            }
            Some(_) => {}
        }

        if !(1..=365).contains(&self.session_ttl_days) {
            return Err(ConfigError::InvalidSessionTtl {
                value: self.session_ttl_days,
            });
        }

        if self.upload_max_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit);
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }

        for (name, value) in [
            ("IDENTITY_API_BASE", &self.identity_api_base),
            ("STORAGE_API_BASE", &self.storage_api_base),
            ("PAYMENTS_API_BASE", &self.payments_api_base),
        ] {
            if let Err(source) = url::Url::parse(value) {
                return Err(ConfigError::InvalidUrl {
                    key: name,
                    value: value.clone(),
                    source,
                });
            }
        }

        // Integration credentials are only optional for local and test profiles
        if !self.is_development_profile() {
            if self.identity_project_id.is_none() || self.identity_service_token.is_none() {
                return Err(ConfigError::MissingIdentityCredentials);
            }
            if self.storage_cloud_name.is_none()
                || self.storage_api_key.is_none()
                || self.storage_api_secret.is_none()
            {
                return Err(ConfigError::MissingStorageCredentials);
            }
            if self.payments_secret_key.is_none() {
                return Err(ConfigError::MissingPaymentsSecretKey);
            }
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "postgresql://localhost:5432/turfy".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_session_ttl_days() -> i64 {
    30
}

fn default_identity_api_base() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_storage_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

fn default_payments_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_upload_max_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_seed_reference_data() -> bool {
    true
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("session secret is missing; set TURFY_SESSION_SECRET")]
    MissingSessionSecret,
    #[error("session secret must be at least 32 bytes, got {length}")]
    SessionSecretTooShort { length: usize },
    #[error("session ttl must be between 1 and 365 days, got {value}")]
    InvalidSessionTtl { value: i64 },
    #[error("upload size limit must be positive")]
    InvalidUploadLimit,
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("database pool size must be positive")]
    InvalidPoolSize,
    #[error("invalid value '{value}' for TURFY_{key}: {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("invalid value '{value}' for TURFY_{key}")]
    InvalidValue { key: &'static str, value: String },
    #[error(
        "identity provider credentials are missing; set TURFY_IDENTITY_PROJECT_ID and TURFY_IDENTITY_SERVICE_TOKEN"
    )]
    MissingIdentityCredentials,
    #[error(
        "object storage credentials are missing; set TURFY_STORAGE_CLOUD_NAME, TURFY_STORAGE_API_KEY and TURFY_STORAGE_API_SECRET"
    )]
    MissingStorageCredentials,
    #[error("payment processor secret key is missing; set TURFY_PAYMENTS_SECRET_KEY")]
    MissingPaymentsSecretKey,
}

/// Loads configuration using layered `.env` files and `TURFY_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.{profile}`, `.env.{profile}.local`, then the
    /// process environment, with later layers winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_string(&mut layered, "PROFILE").unwrap_or(profile_hint);

        let config = AppConfig {
            profile,
            api_bind_addr: take_string(&mut layered, "API_BIND_ADDR")
                .unwrap_or_else(default_api_bind_addr),
            log_level: take_string(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level),
            log_format: take_string(&mut layered, "LOG_FORMAT")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or_else(default_log_format),
            database_url: take_string(&mut layered, "DATABASE_URL")
                .unwrap_or_else(default_database_url),
            db_max_connections: take_parsed(&mut layered, "DB_MAX_CONNECTIONS")?
                .unwrap_or_else(default_db_max_connections),
            db_acquire_timeout_ms: take_parsed(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")?
                .unwrap_or_else(default_db_acquire_timeout_ms),
            session_secret: take_string(&mut layered, "SESSION_SECRET"),
            session_ttl_days: take_parsed(&mut layered, "SESSION_TTL_DAYS")?
                .unwrap_or_else(default_session_ttl_days),
            identity_api_base: take_string(&mut layered, "IDENTITY_API_BASE")
                .unwrap_or_else(default_identity_api_base),
            identity_project_id: take_string(&mut layered, "IDENTITY_PROJECT_ID"),
            identity_service_token: take_string(&mut layered, "IDENTITY_SERVICE_TOKEN"),
            storage_api_base: take_string(&mut layered, "STORAGE_API_BASE")
                .unwrap_or_else(default_storage_api_base),
            storage_cloud_name: take_string(&mut layered, "STORAGE_CLOUD_NAME"),
            storage_api_key: take_string(&mut layered, "STORAGE_API_KEY"),
            storage_api_secret: take_string(&mut layered, "STORAGE_API_SECRET"),
            payments_api_base: take_string(&mut layered, "PAYMENTS_API_BASE")
                .unwrap_or_else(default_payments_api_base),
            payments_secret_key: take_string(&mut layered, "PAYMENTS_SECRET_KEY"),
            upload_max_bytes: take_parsed(&mut layered, "UPLOAD_MAX_BYTES")?
                .unwrap_or_else(default_upload_max_bytes),
            seed_reference_data: take_parsed(&mut layered, "SEED_REFERENCE_DATA")?
                .unwrap_or_else(default_seed_reference_data),
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_string(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn take_parsed<T: std::str::FromStr>(
    values: &mut BTreeMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match take_string(values, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            session_secret: Some("s".repeat(32)),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_validate_once_secret_is_present() {
        assert!(valid_config().validate().is_ok());
        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::MissingSessionSecret)
        ));
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let config = AppConfig {
            session_secret: Some("too-short".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SessionSecretTooShort { length: 9 })
        ));
    }

    #[test]
    fn production_profile_requires_integration_credentials() {
        let mut config = AppConfig {
            profile: "prod".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingIdentityCredentials)
        ));

        config.identity_project_id = Some("turfy-prod".to_string());
        config.identity_service_token = Some("token".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingStorageCredentials)
        ));

        config.storage_cloud_name = Some("turfy".to_string());
        config.storage_api_key = Some("key".to_string());
        config.storage_api_secret = Some("secret".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPaymentsSecretKey)
        ));

        config.payments_secret_key = Some("sk_live_123".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn redacted_json_hides_secrets() {
        let config = AppConfig {
            payments_secret_key: Some("sk_test_abc".to_string()),
            storage_api_secret: Some("cloud-secret".to_string()),
            ..valid_config()
        };
        let json = config.redacted_json().unwrap();
        assert!(!json.contains("sk_test_abc"));
        assert!(!json.contains("cloud-secret"));
        assert!(!json.contains(&"s".repeat(32)));
        assert!(json.contains(REDACTED));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let config = AppConfig {
            log_format: "xml".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogFormat { .. })
        ));
    }
}
