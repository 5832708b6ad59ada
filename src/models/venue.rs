//! Venue entity model
//!
//! The root entity of the admin portal. Lifecycle `status` and soft-delete
//! `deleted_at` are independent columns: neither operation touches the other.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StringList;

/// Venue entity representing a bookable physical site owned by a venue-owner user
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venues")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user; never changed after creation
    pub owner_id: Uuid,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub address: String,

    /// ISO 3166-1 alpha-2
    pub country: String,
    /// ISO 4217
    pub currency: String,

    pub longitude: f64,
    pub latitude: f64,

    /// Amenity `value` slugs
    #[sea_orm(column_type = "JsonBinary")]
    pub amenities: StringList,
    /// Sports type identifiers
    #[sea_orm(column_type = "JsonBinary")]
    pub sports_types: StringList,
    /// Ordered image URLs
    #[sea_orm(column_type = "JsonBinary")]
    pub images: StringList,

    pub commission_percentage: f64,
    pub stripe_account_id: Option<String>,
    pub stripe_onboarding_complete: bool,

    pub status: VenueStatus,
    pub is_enabled: bool,
    pub deleted_at: Option<DateTimeWithTimeZone>,

    pub rating_average: f64,
    pub rating_count: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub rating_distribution: RatingDistribution,

    #[sea_orm(column_type = "JsonBinary")]
    pub managers: Managers,

    /// Outcome of the image relocation leg of venue creation
    pub media_provisioning: ProvisioningState,
    /// Outcome of the payment account leg of venue creation
    pub payment_provisioning: ProvisioningState,
    /// Images still in the temporary namespace: written by the first insert,
    /// cleared once relocated, kept for the ones whose relocation failed
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub pending_media: Option<PendingMediaList>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::facility::Entity")]
    Facilities,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::facility::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Facilities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Review status of a venue. Every status is reachable from every other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum VenueStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl VenueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueStatus::Pending => "pending",
            VenueStatus::Approved => "approved",
            VenueStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(VenueStatus::Pending),
            "approved" => Some(VenueStatus::Approved),
            "rejected" => Some(VenueStatus::Rejected),
            _ => None,
        }
    }
}

/// State of one provisioning leg (image relocation or payment account) of venue creation
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ProvisioningState {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Nothing to do for this leg (e.g. no temporary images were supplied)
    #[sea_orm(string_value = "skipped")]
    Skipped,
}

impl ProvisioningState {
    /// `Pending` after an interrupted create, `Failed` after an upstream error
    pub fn is_unfinished(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

/// Per-star review counts, maintained outside this service
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct RatingDistribution {
    #[serde(rename = "1")]
    pub one: i32,
    #[serde(rename = "2")]
    pub two: i32,
    #[serde(rename = "3")]
    pub three: i32,
    #[serde(rename = "4")]
    pub four: i32,
    #[serde(rename = "5")]
    pub five: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ManagerRole {
    Manager,
    Assistant,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueManager {
    pub user_id: Uuid,
    pub role: ManagerRole,
}

#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct Managers(pub Vec<VenueManager>);

/// An image that could not be moved out of the temporary namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingMedia {
    /// Index into `images` currently holding the fallback URL
    pub position: usize,
    pub url: String,
    pub storage_key: String,
}

#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct PendingMediaList(pub Vec<PendingMedia>);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn facilities_join_from_the_venue_side() {
        let sql = Entity::find()
            .find_with_related(crate::models::facility::Entity)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"LEFT JOIN "facilities""#), "{sql}");
        assert!(sql.contains(r#""facilities"."venue_id""#), "{sql}");
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            VenueStatus::Pending,
            VenueStatus::Approved,
            VenueStatus::Rejected,
        ] {
            assert_eq!(VenueStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VenueStatus::parse("deleted"), None);
        assert_eq!(VenueStatus::parse("Approved"), None);
    }

    #[test]
    fn rating_distribution_uses_star_keys() {
        let json = serde_json::to_value(RatingDistribution {
            five: 2,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["5"], 2);
        assert_eq!(json["1"], 0);
    }

    #[test]
    fn managers_serialize_as_plain_array() {
        let managers = Managers(vec![VenueManager {
            user_id: Uuid::nil(),
            role: ManagerRole::Assistant,
        }]);
        let json = serde_json::to_value(&managers).unwrap();
        assert_eq!(json[0]["role"], "assistant");
        assert!(json[0].get("userId").is_some());
    }
}
