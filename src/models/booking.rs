//! Booking entity model
//!
//! Declarative schema only: nothing in this service creates or prices bookings.
//! A booking is a run of priced segments that all reserve the same quantity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub venue_id: Uuid,
    pub facility_id: Uuid,
    pub currency: String,
    pub customer_name: Option<String>,
    pub customer_mobile: Option<String>,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub capacity: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub segments: Segments,
    pub subtotal: f64,
    pub total_discount: f64,
    pub booking_fee: f64,
    pub booking_fee_percentage: f64,
    pub venue_commission: f64,
    pub venue_commission_percentage: f64,
    pub total_amount: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub applied_discounts: AppliedDiscounts,
    pub payment_intent_id: Option<String>,
    pub payment_id: Option<Uuid>,
    pub status: BookingStatus,
    pub approval_required: bool,
    pub approval_status: ApprovalStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub approval_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub additional_info: Option<String>,
    pub created_by: Uuid,
    pub origin: BookingOrigin,
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
    #[sea_orm(
        belongs_to = "super::facility::Entity",
        from = "Column::FacilityId",
        to = "super::facility::Column::Id"
    )]
    Facility,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl Related<super::facility::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Facility.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "awaiting_payment")]
    #[default]
    AwaitingPayment,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "payment_failed")]
    PaymentFailed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum BookingOrigin {
    #[sea_orm(string_value = "system")]
    #[default]
    System,
    /// Entered by venue staff rather than through checkout
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
}

/// Discount applied to a single segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDiscount {
    pub discount_id: Uuid,
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    pub amount: f64,
}

/// A contiguous, uniformly priced slice of a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub quantity: i32,
    pub base_price: f64,
    pub final_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<SegmentDiscount>,
}

#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct Segments(pub Vec<Segment>);

impl Segments {
    /// Earliest start and latest end across all segments.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.0.iter().map(|s| s.start_time).min()?;
        let end = self.0.iter().map(|s| s.end_time).max()?;
        Some((start, end))
    }

    /// Shared segment rules: at least one segment, each well-ordered, and every
    /// segment reserving the same quantity as the booking's capacity.
    pub fn check(&self, capacity: i32, errors: &mut Vec<String>) {
        let Some(first) = self.0.first() else {
            errors.push("at least one segment is required".to_string());
            return;
        };

        if capacity < 1 {
            errors.push("capacity must be at least 1".to_string());
        }

        for (index, segment) in self.0.iter().enumerate() {
            if segment.end_time <= segment.start_time {
                errors.push(format!("segment {index} must end after it starts"));
            }
            if segment.base_price < 0.0 || segment.final_price < 0.0 {
                errors.push(format!("segment {index} prices must not be negative"));
            }
        }

        if self.0.iter().any(|s| s.quantity != first.quantity) {
            errors.push("all segments must have the same quantity".to_string());
        } else if first.quantity != capacity {
            errors.push(format!(
                "capacity {capacity} must equal segment quantity {}",
                first.quantity
            ));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub discount_id: Uuid,
    pub code: String,
    pub amount: f64,
}

#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct AppliedDiscounts(pub Vec<AppliedDiscount>);

impl Model {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn final_amount(&self) -> f64 {
        self.subtotal - self.total_discount
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        validation::check_currency("currency", &self.currency, &mut errors);
        self.segments.check(self.capacity, &mut errors);
        if self.end_time <= self.start_time {
            errors.push("endTime must be after startTime".to_string());
        }
        for (field, value) in [
            ("bookingFeePercentage", self.booking_fee_percentage),
            ("venueCommissionPercentage", self.venue_commission_percentage),
        ] {
            validation::check_range(field, value, 0.0, 100.0, &mut errors);
        }
        if self.total_discount > self.subtotal {
            errors.push("totalDiscount must not exceed subtotal".to_string());
        }

        validation::finish(errors)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub fn segment(offset_hours: i64, quantity: i32) -> Segment {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap() + Duration::hours(offset_hours);
        Segment {
            start_time: start,
            end_time: start + Duration::hours(1),
            quantity,
            base_price: 40.0,
            final_price: 40.0,
            discount: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::segment;
    use super::*;

    fn booking(segments: Vec<Segment>, capacity: i32) -> Model {
        let segments = Segments(segments);
        let (start, end) = segments.span().unwrap_or_default();
        Model {
            id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            currency: "GBP".to_string(),
            customer_name: None,
            customer_mobile: None,
            start_time: start.into(),
            end_time: end.into(),
            capacity,
            segments,
            subtotal: 80.0,
            total_discount: 10.0,
            booking_fee: 2.4,
            booking_fee_percentage: 3.0,
            venue_commission: 8.0,
            venue_commission_percentage: 10.0,
            total_amount: 72.4,
            applied_discounts: AppliedDiscounts::default(),
            payment_intent_id: None,
            payment_id: None,
            status: BookingStatus::default(),
            approval_required: false,
            approval_status: ApprovalStatus::default(),
            approval_notes: None,
            approved_by: None,
            approved_at: None,
            additional_info: None,
            created_by: Uuid::new_v4(),
            origin: BookingOrigin::default(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn derived_fields_follow_segments() {
        let model = booking(vec![segment(1, 2), segment(0, 2)], 2);
        assert!(model.validate().is_ok());
        assert_eq!(model.duration_minutes(), 120);
        assert_eq!(model.final_amount(), 70.0);
        assert_eq!(model.status, BookingStatus::AwaitingPayment);
    }

    #[test]
    fn empty_segments_are_rejected() {
        let errors = booking(vec![], 1).validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("at least one segment")));
    }

    #[test]
    fn mixed_quantities_are_rejected() {
        let errors = booking(vec![segment(0, 2), segment(1, 3)], 2)
            .validate()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.contains("same quantity")));
    }

    #[test]
    fn capacity_must_match_quantity() {
        let errors = booking(vec![segment(0, 4)], 2).validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("capacity 2")));
    }
}
