//! Test utilities shared by the integration tests.
//!
//! Provides an in-memory SQLite database with migrations applied, user
//! fixtures, and in-memory fakes of the identity, storage and payment seams.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use turfy_admin::auth::{SessionKeys, SessionSubject};
use turfy_admin::config::AppConfig;
use turfy_admin::integrations::{
    ConnectedAccount, ConnectedAccountRequest, IdentityProvider, IdentityUser, ObjectStorage,
    PaymentProcessor, StoredObject, UploadObject, UpstreamError,
};
use turfy_admin::media::MediaService;
use turfy_admin::models::user::{self, UserRole};
use turfy_admin::payments::PaymentAccountProvisioner;
use turfy_admin::server::{AppState, Integrations, create_app};
use turfy_admin::venue_lifecycle::VenueLifecycle;

pub const TEST_SECRET: &[u8] = b"integration-test-session-secret!";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Inserts a verified user directly.
pub async fn insert_user(
    db: &DatabaseConnection,
    name: &str,
    email: Option<&str>,
    role: UserRole,
) -> Result<user::Model> {
    let now = Utc::now().fixed_offset();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        external_id: Set(format!("uid-{}", Uuid::new_v4().simple())),
        name: Set(name.to_string()),
        email: Set(email.map(str::to_string)),
        profile_picture: Set(String::new()),
        role: Set(role),
        verified: Set(true),
        role_profile: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Object storage that renames in memory; keys marked failing return HTTP 500.
#[derive(Default)]
pub struct FakeStorage {
    failing: Mutex<HashSet<String>>,
    pub renames: Mutex<Vec<(String, String)>>,
    pub uploads: Mutex<Vec<UploadObject>>,
}

impl FakeStorage {
    pub fn fail_key(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal_key(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub fn url_for(key: &str) -> String {
        format!("https://cdn.test/{key}")
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, object: UploadObject) -> Result<StoredObject, UpstreamError> {
        let key = format!("{}/{}", object.folder, object.file_name);
        self.uploads.lock().unwrap().push(object);
        Ok(StoredObject {
            url: Self::url_for(&key),
            storage_key: key,
        })
    }

    async fn rename(&self, from_key: &str, to_key: &str) -> Result<StoredObject, UpstreamError> {
        if self.failing.lock().unwrap().contains(from_key) {
            return Err(UpstreamError::Status {
                service: "object storage",
                status: 500,
                body: "rename failed".to_string(),
            });
        }
        self.renames
            .lock()
            .unwrap()
            .push((from_key.to_string(), to_key.to_string()));
        Ok(StoredObject {
            url: Self::url_for(to_key),
            storage_key: to_key.to_string(),
        })
    }
}

/// Payment processor that issues sequential account ids unless told to fail.
#[derive(Default)]
pub struct FakePayments {
    failing: AtomicBool,
    issued: AtomicUsize,
    pub requests: Mutex<Vec<ConnectedAccountRequest>>,
}

impl FakePayments {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentProcessor for FakePayments {
    async fn create_connected_account(
        &self,
        request: &ConnectedAccountRequest,
    ) -> Result<ConnectedAccount, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError::Status {
                service: "payment processor",
                status: 402,
                body: "card_declined".to_string(),
            });
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ConnectedAccount {
            id: format!("acct_test_{n}"),
        })
    }
}

/// Identity provider that knows a fixed set of emails.
#[derive(Default)]
pub struct FakeIdentity {
    known: Mutex<HashSet<String>>,
}

impl FakeIdentity {
    pub fn register(&self, email: &str) {
        self.known.lock().unwrap().insert(email.to_string());
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityUser, UpstreamError> {
        Err(UpstreamError::MalformedResponse {
            service: "identity provider",
            details: format!("unknown token {id_token}"),
        })
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityUser>, UpstreamError> {
        Ok(self
            .known
            .lock()
            .unwrap()
            .contains(email)
            .then(|| IdentityUser {
                uid: format!("remote-{email}"),
                email: Some(email.to_string()),
            }))
    }
}

/// The full application wired to in-memory fakes
pub struct TestApp {
    pub db: DatabaseConnection,
    pub router: Router,
    pub sessions: Arc<SessionKeys>,
    pub storage: Arc<FakeStorage>,
    pub payments: Arc<FakePayments>,
    pub identity: Arc<FakeIdentity>,
    pub lifecycle: VenueLifecycle,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = setup_test_db().await.unwrap();
        let sessions = Arc::new(SessionKeys::new(TEST_SECRET, Duration::days(30)));
        let storage = Arc::new(FakeStorage::default());
        let payments = Arc::new(FakePayments::default());
        let identity = Arc::new(FakeIdentity::default());

        let state = AppState::new(
            Arc::new(config),
            db.clone(),
            sessions.clone(),
            Integrations {
                identity: identity.clone(),
                storage: storage.clone(),
                payments: payments.clone(),
            },
        );
        let lifecycle = state.lifecycle.clone();

        Self {
            router: create_app(state),
            db,
            sessions,
            storage,
            payments,
            identity,
            lifecycle,
        }
    }

    pub fn token(&self, role: UserRole) -> String {
        self.sessions
            .issue(SessionSubject {
                user_id: Uuid::new_v4(),
                email: format!("{}@turfy.io", role.as_str()),
                name: "Test".to_string(),
                role,
                external_id: "remote-test".to_string(),
            })
            .unwrap()
            .0
    }

    pub fn admin_token(&self) -> String {
        self.token(UserRole::Admin)
    }

    /// Sends a request through the router and decodes the JSON body (Null if empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

/// A lifecycle over the given fakes, without the HTTP layer
pub fn lifecycle_with(
    db: &DatabaseConnection,
    storage: Arc<FakeStorage>,
    payments: Arc<FakePayments>,
) -> VenueLifecycle {
    VenueLifecycle::new(
        db.clone(),
        MediaService::new(storage, 10 * 1024 * 1024),
        PaymentAccountProvisioner::new(payments),
    )
}
