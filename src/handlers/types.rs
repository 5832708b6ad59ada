//! # Common API Types
//!
//! Response shapes shared across handlers. Every body is camelCase.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user;
use crate::models::venue::{
    self, ManagerRole, PendingMedia, ProvisioningState, RatingDistribution, VenueStatus,
};

/// A venue manager entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDto {
    pub user_id: Uuid,
    pub role: ManagerRole,
}

/// Saga state of venue creation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningDto {
    pub media: ProvisioningState,
    pub payment: ProvisioningState,
    /// Images still pointing at the temporary upload namespace
    pub pending_media: Vec<PendingMedia>,
}

/// Full venue record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Pitch A")]
    pub name: String,
    pub description: String,
    pub address: String,
    #[schema(example = "GB")]
    pub country: String,
    #[schema(example = "GBP")]
    pub currency: String,
    pub longitude: f64,
    pub latitude: f64,
    pub amenities: Vec<String>,
    pub sports_types: Vec<String>,
    pub images: Vec<String>,
    pub commission_percentage: f64,
    pub stripe_account_id: Option<String>,
    pub stripe_onboarding_complete: bool,
    pub status: VenueStatus,
    pub is_enabled: bool,
    pub deleted_at: Option<DateTime<FixedOffset>>,
    pub rating_average: f64,
    pub rating_count: i32,
    pub rating_distribution: RatingDistribution,
    pub managers: Vec<ManagerDto>,
    pub provisioning: ProvisioningDto,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<venue::Model> for VenueResponse {
    fn from(venue: venue::Model) -> Self {
        Self {
            id: venue.id,
            owner_id: venue.owner_id,
            name: venue.name,
            description: venue.description,
            address: venue.address,
            country: venue.country,
            currency: venue.currency,
            longitude: venue.longitude,
            latitude: venue.latitude,
            amenities: venue.amenities.0,
            sports_types: venue.sports_types.0,
            images: venue.images.0,
            commission_percentage: venue.commission_percentage,
            stripe_account_id: venue.stripe_account_id,
            stripe_onboarding_complete: venue.stripe_onboarding_complete,
            status: venue.status,
            is_enabled: venue.is_enabled,
            deleted_at: venue.deleted_at,
            rating_average: venue.rating_average,
            rating_count: venue.rating_count,
            rating_distribution: venue.rating_distribution,
            managers: venue
                .managers
                .0
                .into_iter()
                .map(|m| ManagerDto {
                    user_id: m.user_id,
                    role: m.role,
                })
                .collect(),
            provisioning: ProvisioningDto {
                media: venue.media_provisioning,
                payment: venue.payment_provisioning,
                pending_media: venue.pending_media.map(|p| p.0).unwrap_or_default(),
            },
            created_at: venue.created_at,
            updated_at: venue.updated_at,
        }
    }
}

/// `{id, name, email}` view of a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// A venue with its owner populated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueDetailResponse {
    #[serde(flatten)]
    pub venue: VenueResponse,
    /// Null when the owner record no longer exists
    pub owner: Option<UserSummary>,
}

/// One page of venues
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueListResponse {
    pub venues: Vec<VenueResponse>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Confirmation of a delete or restore, with the affected venue
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VenueActionResponse {
    pub message: String,
    pub venue: VenueResponse,
}
