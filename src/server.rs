//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Turfy admin API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{SessionError, SessionKeys};
use crate::config::AppConfig;
use crate::handlers;
use crate::identity::IdentityGateway;
use crate::integrations::{
    CloudinaryStorage, IdentityProvider, IdentityToolkitClient, ObjectStorage, PaymentProcessor,
    StripeClient,
};
use crate::media::MediaService;
use crate::payments::PaymentAccountProvisioner;
use crate::telemetry;
use crate::venue_lifecycle::VenueLifecycle;

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// External service clients behind their trait seams
#[derive(Clone)]
pub struct Integrations {
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStorage>,
    pub payments: Arc<dyn PaymentProcessor>,
}

impl Integrations {
    /// HTTP clients built from configuration; missing credentials surface as
    /// `NotConfigured` errors on first use.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            identity: Arc::new(IdentityToolkitClient::new(
                config.identity_api_base.clone(),
                config.identity_project_id.clone(),
                config.identity_service_token.clone(),
            )),
            storage: Arc::new(CloudinaryStorage::new(
                config.storage_api_base.clone(),
                config.storage_cloud_name.clone(),
                config.storage_api_key.clone(),
                config.storage_api_secret.clone(),
            )),
            payments: Arc::new(StripeClient::new(
                config.payments_api_base.clone(),
                config.payments_secret_key.clone(),
            )),
        }
    }
}

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub sessions: Arc<SessionKeys>,
    pub identity: IdentityGateway,
    pub media: MediaService,
    pub lifecycle: VenueLifecycle,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        db: DatabaseConnection,
        sessions: Arc<SessionKeys>,
        integrations: Integrations,
    ) -> Self {
        let media = MediaService::new(integrations.storage, config.upload_max_bytes);
        let payments = PaymentAccountProvisioner::new(integrations.payments);

        Self {
            identity: IdentityGateway::new(db.clone(), integrations.identity, sessions.clone()),
            lifecycle: VenueLifecycle::new(db.clone(), media.clone(), payments),
            media,
            sessions,
            db,
            config,
        }
    }

    pub fn from_config(config: AppConfig, db: DatabaseConnection) -> Result<Self, SessionError> {
        let sessions = Arc::new(SessionKeys::from_config(&config)?);
        let integrations = Integrations::from_config(&config);
        Ok(Self::new(Arc::new(config), db, sessions, integrations))
    }
}

impl FromRef<AppState> for Arc<SessionKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let upload_limit = state.config.upload_max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/session", get(handlers::auth::current_session))
        .route(
            "/venues",
            get(handlers::venues::list_venues).post(handlers::venues::create_venue),
        )
        .route("/venues/stats", get(handlers::venues::venue_stats))
        .route("/venues/search", get(handlers::venues::search_venues))
        .route(
            "/venues/{id}",
            get(handlers::venues::get_venue)
                .patch(handlers::venues::update_venue)
                .delete(handlers::venues::delete_venue),
        )
        .route("/venues/{id}/restore", post(handlers::venues::restore_venue))
        .route(
            "/venues/{id}/provisioning/retry",
            post(handlers::venues::retry_provisioning),
        )
        .route("/amenities", get(handlers::reference_data::list_amenities))
        .route(
            "/sports-types",
            get(handlers::reference_data::list_sports_types),
        )
        .route(
            "/users/venue-owners",
            get(handlers::users::list_venue_owners),
        )
        .route(
            "/upload",
            post(handlers::upload::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let state = AppState::from_config(config, db).context("Failed to build session keys")?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}

/// Registers the bearer session scheme referenced by protected operations
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::auth::login,
        crate::handlers::auth::current_session,
        crate::handlers::venues::list_venues,
        crate::handlers::venues::create_venue,
        crate::handlers::venues::venue_stats,
        crate::handlers::venues::search_venues,
        crate::handlers::venues::get_venue,
        crate::handlers::venues::update_venue,
        crate::handlers::venues::delete_venue,
        crate::handlers::venues::restore_venue,
        crate::handlers::venues::retry_provisioning,
        crate::handlers::reference_data::list_amenities,
        crate::handlers::reference_data::list_sports_types,
        crate::handlers::users::list_venue_owners,
        crate::handlers::upload::upload,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::auth::SessionClaims,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::types::VenueResponse,
            crate::handlers::types::VenueDetailResponse,
            crate::handlers::types::VenueListResponse,
            crate::handlers::types::VenueActionResponse,
            crate::handlers::types::UserSummary,
            crate::venue_lifecycle::CreateVenueInput,
            crate::venue_lifecycle::UpdateVenueInput,
            crate::venue_lifecycle::ImageInput,
            crate::repositories::VenueStats,
            crate::repositories::VenueSummary,
            crate::handlers::reference_data::AmenityResponse,
            crate::handlers::reference_data::SportsTypeResponse,
            crate::handlers::users::VenueOwnerOption,
            crate::handlers::upload::UploadResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin sign-in and session"),
        (name = "venues", description = "Venue lifecycle management"),
        (name = "reference-data", description = "Amenity and sports type catalogs"),
        (name = "users", description = "User lookups"),
        (name = "media", description = "Image uploads")
    ),
    info(
        title = "Turfy Admin API",
        description = "Administrative API for venue lifecycle management",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
