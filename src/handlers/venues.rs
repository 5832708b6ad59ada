//! # Venues API Handlers
//!
//! Admin CRUD over venues. Reads of a single venue are open to any session;
//! every write and the listing require an admin session.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header::LOCATION},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{AdminSession, Session};
use crate::error::{ApiError, bad_request, validation_error};
use crate::handlers::types::{
    VenueActionResponse, VenueDetailResponse, VenueListResponse, VenueResponse,
};
use crate::repositories::{StatusFilter, VenueFilter, VenueSort, VenueStats, VenueSummary};
use crate::server::AppState;
use crate::venue_lifecycle::{CreateVenueInput, UpdateVenueInput};

/// Query parameters for the venue list
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListVenuesQuery {
    /// `pending`, `approved`, `rejected`, `all` (default) or `deleted`
    pub status: Option<String>,
    /// Case-insensitive substring of name or address
    pub q: Option<String>,
    /// ISO country code
    pub country: Option<String>,
    /// `field_direction`, default `createdAt_desc`
    pub sort: Option<String>,
    /// 1-based page number (page size is 10)
    pub page: Option<u64>,
}

impl ListVenuesQuery {
    fn into_filter(self) -> Result<VenueFilter, ApiError> {
        let mut errors = Vec::new();

        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            None => StatusFilter::default(),
            Some(raw) => StatusFilter::parse(raw).unwrap_or_else(|| {
                errors.push(format!(
                    "status must be one of pending, approved, rejected, all, deleted (got '{raw}')"
                ));
                StatusFilter::default()
            }),
        };

        let sort = match self.sort.as_deref().filter(|s| !s.is_empty()) {
            None => VenueSort::default(),
            Some(raw) => VenueSort::parse(raw).unwrap_or_else(|| {
                errors.push(format!("sort '{raw}' is not supported"));
                VenueSort::default()
            }),
        };

        let page = self.page.unwrap_or(1);
        if page == 0 {
            errors.push("page must be at least 1".to_string());
        }

        if !errors.is_empty() {
            return Err(validation_error(errors));
        }

        Ok(VenueFilter {
            status,
            q: self.q,
            country: self.country,
            sort,
            page,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchVenuesQuery {
    /// Case-insensitive substring of the venue name
    pub q: Option<String>,
}

fn venue_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| bad_request("Venue id must be a UUID"))
}

/// List venues with filters and page-number pagination
#[utoipa::path(
    get,
    path = "/venues",
    security(("bearer_auth" = [])),
    params(ListVenuesQuery),
    responses(
        (status = 200, description = "One page of venues", body = VenueListResponse),
        (status = 400, description = "Invalid filter", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn list_venues(
    State(state): State<AppState>,
    _admin: AdminSession,
    query: Result<Query<ListVenuesQuery>, QueryRejection>,
) -> Result<Json<VenueListResponse>, ApiError> {
    let Query(query) = query.map_err(|err| bad_request(&err.body_text()))?;
    let filter = query.into_filter()?;

    let page = state.lifecycle.list(&filter).await?;

    Ok(Json(VenueListResponse {
        venues: page.venues.into_iter().map(VenueResponse::from).collect(),
        total_count: page.total_count,
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}

/// Create a venue, relocate its images and provision its payment account
#[utoipa::path(
    post,
    path = "/venues",
    security(("bearer_auth" = [])),
    request_body = CreateVenueInput,
    responses(
        (status = 201, description = "Venue created (image and payment legs may have degraded)", body = VenueResponse, headers(
            ("Location", description = "URL of the created venue")
        )),
        (status = 400, description = "Validation failed or owner has no email", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError),
        (status = 404, description = "Venue owner not found", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn create_venue(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    payload: Result<Json<CreateVenueInput>, JsonRejection>,
) -> Result<(StatusCode, [(axum::http::HeaderName, String); 1], Json<VenueResponse>), ApiError> {
    let Json(input) = payload?;

    let venue = state.lifecycle.create(input).await?;
    tracing::info!(venue_id = %venue.id, admin_id = %admin.sub, "Venue created by admin");

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/venues/{}", venue.id))],
        Json(venue.into()),
    ))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/venues/stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Venue counts", body = VenueStats),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn venue_stats(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<VenueStats>, ApiError> {
    Ok(Json(state.lifecycle.stats().await?))
}

/// Look venues up by name (at most 10 results)
#[utoipa::path(
    get,
    path = "/venues/search",
    params(SearchVenuesQuery),
    responses(
        (status = 200, description = "Matching venues", body = [VenueSummary])
    ),
    tag = "venues"
)]
pub async fn search_venues(
    State(state): State<AppState>,
    Query(query): Query<SearchVenuesQuery>,
) -> Result<Json<Vec<VenueSummary>>, ApiError> {
    let q = query.q.unwrap_or_default();
    Ok(Json(state.lifecycle.search(&q).await?))
}

/// Fetch one venue with its owner
#[utoipa::path(
    get,
    path = "/venues/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Venue id")),
    responses(
        (status = 200, description = "Venue", body = VenueDetailResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 404, description = "Venue not found", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn get_venue(
    State(state): State<AppState>,
    _session: Session,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VenueDetailResponse>, ApiError> {
    let id = venue_id(path)?;
    let (venue, owner) = state.lifecycle.get(id).await?;

    Ok(Json(VenueDetailResponse {
        venue: venue.into(),
        owner: owner.map(Into::into),
    }))
}

/// Update status or editable fields
#[utoipa::path(
    patch,
    path = "/venues/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Venue id")),
    request_body = UpdateVenueInput,
    responses(
        (status = 200, description = "Updated venue", body = VenueResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError),
        (status = 404, description = "Venue not found", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn update_venue(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateVenueInput>, JsonRejection>,
) -> Result<Json<VenueResponse>, ApiError> {
    let id = venue_id(path)?;
    let Json(input) = payload?;

    let venue = state.lifecycle.update(id, input).await?;
    Ok(Json(venue.into()))
}

/// Soft-delete a venue; its status is left as is
#[utoipa::path(
    delete,
    path = "/venues/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Venue id")),
    responses(
        (status = 200, description = "Venue deleted", body = VenueActionResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError),
        (status = 404, description = "Venue not found", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn delete_venue(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VenueActionResponse>, ApiError> {
    let id = venue_id(path)?;
    let venue = state.lifecycle.soft_delete(id).await?;

    Ok(Json(VenueActionResponse {
        message: "Venue deleted successfully".to_string(),
        venue: venue.into(),
    }))
}

/// Clear the soft-delete marker of a venue
#[utoipa::path(
    post,
    path = "/venues/{id}/restore",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Venue id")),
    responses(
        (status = 200, description = "Venue restored", body = VenueActionResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError),
        (status = 404, description = "Venue not found", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn restore_venue(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VenueActionResponse>, ApiError> {
    let id = venue_id(path)?;
    let venue = state.lifecycle.restore(id).await?;

    Ok(Json(VenueActionResponse {
        message: "Venue restored successfully".to_string(),
        venue: venue.into(),
    }))
}

/// Re-run failed image relocation and payment provisioning
#[utoipa::path(
    post,
    path = "/venues/{id}/provisioning/retry",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Venue id")),
    responses(
        (status = 200, description = "Venue after the retry; failed legs stay failed", body = VenueResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError),
        (status = 404, description = "Venue not found", body = ApiError)
    ),
    tag = "venues"
)]
pub async fn retry_provisioning(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VenueResponse>, ApiError> {
    let id = venue_id(path)?;
    let venue = state.lifecycle.retry_provisioning(id).await?;
    Ok(Json(venue.into()))
}
