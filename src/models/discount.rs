//! Discount entity model

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, FromJsonQueryResult};
use serde::{Deserialize, Serialize};

use super::facility::TimeSegment;
pub use super::booking::DiscountKind;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Stored upper-cased
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub value: f64,
    pub scope: DiscountScope,
    pub venue_id: Uuid,
    pub facility_id: Option<Uuid>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub max_uses_per_user: i32,
    pub min_booking_amount: Option<f64>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub is_active: bool,
    /// Weekdays (0 = Sunday) the code is valid on; empty means every day
    #[sea_orm(column_type = "JsonBinary")]
    pub days_of_week: Weekdays,
    #[sea_orm(column_type = "JsonBinary")]
    pub time_slots: TimeSlots,
    #[sea_orm(column_type = "JsonBinary")]
    pub usage_history: UsageHistory,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed_amount")]
    FixedAmount,
}

impl From<DiscountType> for DiscountKind {
    fn from(value: DiscountType) -> Self {
        match value {
            DiscountType::Percentage => DiscountKind::Percentage,
            DiscountType::FixedAmount => DiscountKind::FixedAmount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum DiscountScope {
    #[sea_orm(string_value = "venue")]
    Venue,
    #[sea_orm(string_value = "facility")]
    Facility,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Weekdays(pub Vec<u8>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct TimeSlots(pub Vec<TimeSegment>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountUsage {
    pub user_id: Uuid,
    pub booking_id: Uuid,
    pub used_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct UsageHistory(pub Vec<DiscountUsage>);

/// Codes are compared case-insensitively by storing them upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Model {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        validation::check_not_blank("code", &self.code, &mut errors);
        if self.code != normalize_code(&self.code) {
            errors.push("code must be upper-case without surrounding spaces".to_string());
        }
        validation::check_not_blank("name", &self.name, &mut errors);

        match self.discount_type {
            DiscountType::Percentage if !(self.value > 0.0 && self.value <= 100.0) => {
                errors.push("percentage discounts must be greater than 0 and at most 100".to_string())
            }
            DiscountType::FixedAmount if self.value <= 0.0 => {
                errors.push("fixed amount discounts must be greater than 0".to_string())
            }
            _ => {}
        }

        if self.scope == DiscountScope::Facility && self.facility_id.is_none() {
            errors.push("facility-scoped discounts require a facilityId".to_string());
        }
        if let Some(max) = self.max_uses
            && max < 1
        {
            errors.push("maxUses must be at least 1".to_string());
        }
        if self.max_uses_per_user < 1 {
            errors.push("maxUsesPerUser must be at least 1".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && end < start
        {
            errors.push("endDate must not be before startDate".to_string());
        }
        if self.days_of_week.0.iter().any(|day| *day > 6) {
            errors.push("daysOfWeek entries must be 0-6".to_string());
        }
        for slot in &self.time_slots.0 {
            if !validation::is_clock_time(&slot.start) || !validation::is_clock_time(&slot.end) {
                errors.push(format!(
                    "time slot {}-{} must use HH:mm",
                    slot.start, slot.end
                ));
            }
        }

        validation::finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn discount(discount_type: DiscountType, value: f64) -> Model {
        Model {
            id: Uuid::new_v4(),
            code: normalize_code(" summer10 "),
            name: "Summer".to_string(),
            description: None,
            discount_type,
            value,
            scope: DiscountScope::Venue,
            venue_id: Uuid::new_v4(),
            facility_id: None,
            max_uses: None,
            used_count: 0,
            max_uses_per_user: 1,
            min_booking_amount: None,
            start_date: None,
            end_date: None,
            is_active: true,
            days_of_week: Weekdays::default(),
            time_slots: TimeSlots::default(),
            usage_history: UsageHistory::default(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn percentage_must_be_within_bounds() {
        assert!(discount(DiscountType::Percentage, 100.0).validate().is_ok());
        assert!(discount(DiscountType::Percentage, 0.0).validate().is_err());
        assert!(discount(DiscountType::Percentage, 100.5).validate().is_err());
    }

    #[test]
    fn fixed_amount_only_needs_to_be_positive() {
        assert!(discount(DiscountType::FixedAmount, 250.0).validate().is_ok());
        assert!(discount(DiscountType::FixedAmount, -1.0).validate().is_err());
    }

    #[test]
    fn code_is_upper_cased() {
        assert_eq!(discount(DiscountType::Percentage, 5.0).code, "SUMMER10");

        let mut lower = discount(DiscountType::Percentage, 5.0);
        lower.code = "summer10".to_string();
        assert!(lower.validate().is_err());
    }

    #[test]
    fn facility_scope_needs_facility() {
        let mut model = discount(DiscountType::Percentage, 5.0);
        model.scope = DiscountScope::Facility;
        assert!(model.validate().is_err());
        model.facility_id = Some(Uuid::new_v4());
        assert!(model.validate().is_ok());
    }
}
