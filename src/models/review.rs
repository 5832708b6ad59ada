//! Review entity model
//!
//! At most one review per booking. Moderation fields are stored but never
//! acted on by this service.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, FromJsonQueryResult};
use serde::{Deserialize, Serialize};

use crate::validation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub facility_id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub attributes: Option<AttributeRatings>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub verification_details: Option<VerificationDetails>,
    pub helpful_count: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub reports: Reports,
    pub flagged_for_moderation: bool,
    pub edited: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id"
    )]
    Venue,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Optional per-aspect scores, each 1-5
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRatings {
    pub cleanliness: Option<i32>,
    pub facilities: Option<i32>,
    pub staff: Option<i32>,
    pub value_for_money: Option<i32>,
    pub location: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDetails {
    pub verified_booking: bool,
    pub booking_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub user_id: Uuid,
    pub reason: String,
    pub reported_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Reports(pub Vec<ReviewReport>);

fn check_stars(field: &str, value: i32, errors: &mut Vec<String>) {
    if !(1..=5).contains(&value) {
        errors.push(format!("{field} must be between 1 and 5"));
    }
}

impl Model {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_stars("rating", self.rating, &mut errors);
        validation::check_max_len("title", self.title.as_deref(), 100, &mut errors);
        validation::check_max_len("comment", self.comment.as_deref(), 1000, &mut errors);

        if let Some(attributes) = &self.attributes {
            for (field, value) in [
                ("cleanliness", attributes.cleanliness),
                ("facilities", attributes.facilities),
                ("staff", attributes.staff),
                ("valueForMoney", attributes.value_for_money),
                ("location", attributes.location),
            ] {
                if let Some(value) = value {
                    check_stars(field, value, &mut errors);
                }
            }
        }
        if self.helpful_count < 0 {
            errors.push("helpfulCount must not be negative".to_string());
        }

        validation::finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn ratings_must_be_one_to_five() {
        let mut review = Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            rating: 5,
            title: Some("Great pitch".to_string()),
            comment: None,
            attributes: Some(AttributeRatings {
                staff: Some(4),
                ..Default::default()
            }),
            verification_details: None,
            helpful_count: 0,
            reports: Reports::default(),
            flagged_for_moderation: false,
            edited: false,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        assert!(review.validate().is_ok());

        review.rating = 0;
        review.attributes = Some(AttributeRatings {
            location: Some(6),
            ..Default::default()
        });
        assert_eq!(review.validate().unwrap_err().len(), 2);
    }
}
