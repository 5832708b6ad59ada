//! # Users API Handlers

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::models::user;
use crate::repositories::UserRepository;
use crate::server::AppState;

/// Shown in place of a missing owner email
pub const NO_EMAIL: &str = "No email";

/// Entry of the venue-owner picker
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VenueOwnerOption {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "owner@example.com")]
    pub email: String,
}

impl From<user::Model> for VenueOwnerOption {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.unwrap_or_else(|| NO_EMAIL.to_string()),
        }
    }
}

/// List venue owners sorted by name
#[utoipa::path(
    get,
    path = "/users/venue-owners",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Venue owners", body = [VenueOwnerOption]),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Admin access required", body = ApiError)
    ),
    tag = "users"
)]
pub async fn list_venue_owners(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<VenueOwnerOption>>, ApiError> {
    let owners = UserRepository::new(&state.db).list_venue_owners().await?;
    Ok(Json(owners.into_iter().map(Into::into).collect()))
}
