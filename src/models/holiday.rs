//! Holiday entity model
//!
//! Closures and altered hours, either on a single date or recurring every year.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::StringList;
use super::facility::{DayHours, WeeklyHours, check_day_segments};
use crate::validation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "holidays")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: String,
    pub holiday_type: HolidayType,
    /// Set for one-time holidays
    pub date: Option<DateTimeWithTimeZone>,
    pub recurring_month: Option<i32>,
    pub recurring_day: Option<i32>,
    /// Affected facilities; empty means the whole venue
    #[sea_orm(column_type = "JsonBinary")]
    pub facility_ids: StringList,
    /// Custom hours when the venue is only partially closed
    #[sea_orm(column_type = "JsonBinary")]
    pub operating_hours: WeeklyHours,
    pub is_full_day_closure: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
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
pub enum HolidayType {
    #[sea_orm(string_value = "public")]
    #[default]
    Public,
    #[sea_orm(string_value = "private")]
    Private,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

impl Model {
    pub fn is_recurring(&self) -> bool {
        self.recurring_month.is_some()
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        validation::check_not_blank("name", &self.name, &mut errors);

        match (self.date, self.recurring_month, self.recurring_day) {
            (Some(_), None, None) => {}
            (None, Some(month), Some(day)) => {
                if !(1..=12).contains(&month) {
                    errors.push("recurringMonth must be 1-12".to_string());
                }
                if !(1..=31).contains(&day) {
                    errors.push("recurringDay must be 1-31".to_string());
                }
            }
            _ => errors.push(
                "a holiday needs either a date or both recurringMonth and recurringDay".to_string(),
            ),
        }

        if !self.is_full_day_closure {
            self.operating_hours
                .0
                .iter()
                .for_each(|day: &DayHours| check_day_segments(day, &mut errors));
        }
        validation::check_max_len("notes", self.notes.as_deref(), 1000, &mut errors);

        validation::finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn holiday() -> Model {
        Model {
            id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            name: "Christmas".to_string(),
            holiday_type: HolidayType::Public,
            date: None,
            recurring_month: Some(12),
            recurring_day: Some(25),
            facility_ids: StringList::default(),
            operating_hours: WeeklyHours::default(),
            is_full_day_closure: true,
            notes: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn recurring_holiday_is_valid() {
        let model = holiday();
        assert!(model.is_recurring());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn date_and_recurrence_are_exclusive() {
        let mut model = holiday();
        model.date = Some(Utc::now().into());
        assert!(model.validate().is_err());

        model.recurring_month = None;
        model.recurring_day = None;
        assert!(model.validate().is_ok());
    }

    #[test]
    fn recurring_bounds_are_checked() {
        let mut model = holiday();
        model.recurring_month = Some(13);
        model.recurring_day = Some(0);
        assert_eq!(model.validate().unwrap_err().len(), 2);
    }
}
