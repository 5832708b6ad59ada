//! Reservation entity model
//!
//! A short-lived hold on facility capacity taken during checkout. Shares the
//! segment rules of bookings.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::booking::Segments;
use crate::validation;

/// Currencies a reservation may be priced in
pub const SUPPORTED_CURRENCIES: &[&str] = &["GBP", "USD", "EUR", "CAD", "AUD", "INR"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub facility_id: Uuid,
    pub venue_id: Uuid,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub capacity: i32,
    pub currency: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub segments: Segments,
    pub subtotal: f64,
    pub total_discount: f64,
    pub final_amount: f64,
    pub booking_fee: f64,
    pub booking_fee_percentage: f64,
    pub venue_commission: f64,
    pub venue_commission_percentage: f64,
    pub total_amount: Option<f64>,
    pub discount_code: Option<String>,
    pub discount_value: f64,
    pub user_id: Uuid,
    pub expires_at: DateTimeWithTimeZone,
    pub booking_id: Option<Uuid>,
    pub status: ReservationStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::facility::Entity",
        from = "Column::FacilityId",
        to = "super::facility::Column::Id"
    )]
    Facility,
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
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Model {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !SUPPORTED_CURRENCIES.contains(&self.currency.as_str()) {
            errors.push(format!(
                "currency must be one of {}",
                SUPPORTED_CURRENCIES.join(", ")
            ));
        }
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

        validation::finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::fixtures::segment;
    use chrono::{Duration, Utc};

    fn reservation(currency: &str) -> Model {
        let segments = Segments(vec![segment(0, 1), segment(1, 1), segment(2, 1)]);
        let (start, end) = segments.span().unwrap();
        Model {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            start_time: start.into(),
            end_time: end.into(),
            capacity: 1,
            currency: currency.to_string(),
            segments,
            subtotal: 120.0,
            total_discount: 0.0,
            final_amount: 120.0,
            booking_fee: 3.6,
            booking_fee_percentage: 3.0,
            venue_commission: 12.0,
            venue_commission_percentage: 10.0,
            total_amount: None,
            discount_code: None,
            discount_value: 0.0,
            user_id: Uuid::new_v4(),
            expires_at: (Utc::now() + Duration::minutes(15)).into(),
            booking_id: None,
            status: ReservationStatus::default(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn duration_spans_all_segments() {
        let model = reservation("GBP");
        assert!(model.validate().is_ok());
        assert_eq!(model.duration_minutes(), 180);
    }

    #[test]
    fn unsupported_currency_is_rejected() {
        let errors = reservation("JPY").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("GBP"));
    }
}
