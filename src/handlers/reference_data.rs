//! # Reference Data Handlers
//!
//! Public read-only catalogs used by the venue form.

use std::collections::BTreeMap;

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{amenity, sports_type};
use crate::repositories::ReferenceDataRepository;
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AmenityResponse {
    pub id: Uuid,
    #[schema(example = "Parking")]
    pub name: String,
    /// Slug stored on venues
    #[schema(example = "parking")]
    pub value: String,
    pub icon: BTreeMap<String, String>,
}

impl From<amenity::Model> for AmenityResponse {
    fn from(model: amenity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            value: model.value,
            icon: model.icon.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SportsTypeResponse {
    pub id: Uuid,
    #[schema(example = "Football")]
    pub name: String,
    pub icon: Option<String>,
}

impl From<sports_type::Model> for SportsTypeResponse {
    fn from(model: sports_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            icon: model.icon,
        }
    }
}

/// List amenities ordered by name
#[utoipa::path(
    get,
    path = "/amenities",
    responses(
        (status = 200, description = "All amenities", body = [AmenityResponse])
    ),
    tag = "reference-data"
)]
pub async fn list_amenities(
    State(state): State<AppState>,
) -> Result<Json<Vec<AmenityResponse>>, ApiError> {
    let amenities = ReferenceDataRepository::new(&state.db)
        .list_amenities()
        .await?;
    Ok(Json(amenities.into_iter().map(Into::into).collect()))
}

/// List sports types ordered by name
#[utoipa::path(
    get,
    path = "/sports-types",
    responses(
        (status = 200, description = "All sports types", body = [SportsTypeResponse])
    ),
    tag = "reference-data"
)]
pub async fn list_sports_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<SportsTypeResponse>>, ApiError> {
    let sports_types = ReferenceDataRepository::new(&state.db)
        .list_sports_types()
        .await?;
    Ok(Json(sports_types.into_iter().map(Into::into).collect()))
}
