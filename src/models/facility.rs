//! Facility entity model
//!
//! A bookable unit inside a venue (a pitch, a court). Opening hours are stored
//! per weekday as a list of `HH:mm` segments.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StringList;
use crate::validation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "facilities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub sports_type_ids: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub booking_policy: BookingPolicy,
    pub capacity: i32,
    pub capacity_type: CapacityType,
    pub min_booking_duration_minutes: i32,
    pub slot_increment_minutes: i32,
    pub max_booking_duration_minutes: Option<i32>,
    #[sea_orm(column_type = "JsonBinary")]
    pub operating_hours: WeeklyHours,
    pub status: FacilityStatus,
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

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum FacilityStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// How `capacity` is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum CapacityType {
    #[sea_orm(string_value = "units")]
    Units,
    #[sea_orm(string_value = "people")]
    People,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPolicy {
    pub auto_accept: bool,
    pub minimum_notice_period_hours: u32,
    pub maximum_advance_booking_days: u32,
    pub cancellation_policy_hours: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            auto_accept: true,
            minimum_notice_period_hours: 2,
            maximum_advance_booking_days: 30,
            cancellation_policy_hours: 24,
        }
    }
}

/// An opening window within a day, both ends `HH:mm`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSegment {
    pub start: String,
    pub end: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    /// 0 = Sunday
    pub day_of_week: u8,
    pub is_closed: bool,
    #[serde(default)]
    pub segments: Vec<TimeSegment>,
}

#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct WeeklyHours(pub Vec<DayHours>);

/// Checks `HH:mm` syntax, `start < end` and that no two segments of the same day overlap.
pub fn check_day_segments(day: &DayHours, errors: &mut Vec<String>) {
    let mut spans = Vec::with_capacity(day.segments.len());
    for segment in &day.segments {
        match (
            validation::clock_minutes(&segment.start),
            validation::clock_minutes(&segment.end),
        ) {
            (Some(start), Some(end)) if start < end => spans.push((start, end)),
            (Some(_), Some(_)) => errors.push(format!(
                "day {}: segment {}-{} must end after it starts",
                day.day_of_week, segment.start, segment.end
            )),
            _ => errors.push(format!(
                "day {}: segment times must be HH:mm, got {}-{}",
                day.day_of_week, segment.start, segment.end
            )),
        }
    }

    spans.sort_unstable();
    if spans.windows(2).any(|pair| pair[1].0 < pair[0].1) {
        errors.push(format!(
            "day {}: time segments must not overlap",
            day.day_of_week
        ));
    }
}

impl Model {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        validation::check_not_blank("name", &self.name, &mut errors);
        if self.capacity < 1 {
            errors.push("capacity must be at least 1".to_string());
        }
        if self.min_booking_duration_minutes < 1 {
            errors.push("minBookingDuration must be positive".to_string());
        }
        if self.slot_increment_minutes < 1 {
            errors.push("slotIncrement must be positive".to_string());
        }
        if let Some(max) = self.max_booking_duration_minutes
            && max < self.min_booking_duration_minutes
        {
            errors.push("maxBookingDuration must not be below minBookingDuration".to_string());
        }

        for day in &self.operating_hours.0 {
            if day.day_of_week > 6 {
                errors.push(format!("dayOfWeek must be 0-6, got {}", day.day_of_week));
            }
            check_day_segments(day, &mut errors);
        }

        validation::finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: &str, end: &str) -> TimeSegment {
        TimeSegment {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    fn day(segments: Vec<TimeSegment>) -> DayHours {
        DayHours {
            day_of_week: 1,
            is_closed: false,
            segments,
        }
    }

    #[test]
    fn adjacent_segments_are_allowed() {
        let mut errors = Vec::new();
        check_day_segments(
            &day(vec![segment("13:00", "22:00"), segment("08:00", "13:00")]),
            &mut errors,
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn overlapping_segments_are_rejected() {
        let mut errors = Vec::new();
        check_day_segments(
            &day(vec![segment("08:00", "12:30"), segment("12:00", "18:00")]),
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("overlap"));
    }

    #[test]
    fn malformed_and_inverted_segments_are_reported() {
        let mut errors = Vec::new();
        check_day_segments(
            &day(vec![segment("25:00", "26:00"), segment("18:00", "09:00")]),
            &mut errors,
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn default_policy_matches_platform_defaults() {
        let policy = BookingPolicy::default();
        assert!(policy.auto_accept);
        assert_eq!(policy.minimum_notice_period_hours, 2);
        assert_eq!(policy.maximum_advance_booking_days, 30);
        assert_eq!(policy.cancellation_policy_hours, 24);
    }
}
