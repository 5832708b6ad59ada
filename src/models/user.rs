//! User entity model
//!
//! One table for every role. Role-specific fields live in the `role_profile`
//! JSON column as a tagged union keyed by the same role discriminator.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Identity-provider uid
    #[sea_orm(unique)]
    pub external_id: String,

    pub name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub profile_picture: String,
    pub role: UserRole,
    pub verified: bool,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub role_profile: Option<RoleProfile>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::venue::Entity")]
    Venues,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

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
pub enum UserRole {
    #[sea_orm(string_value = "customer")]
    #[serde(rename = "customer")]
    #[default]
    Customer,
    #[sea_orm(string_value = "venue-owner")]
    #[serde(rename = "venue-owner")]
    VenueOwner,
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::VenueOwner => "venue-owner",
            UserRole::Admin => "admin",
        }
    }
}

/// Role-specific extension of a user record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum RoleProfile {
    #[serde(rename_all = "camelCase")]
    Customer {
        username: String,
        phone_number: String,
    },
    #[serde(rename_all = "camelCase")]
    VenueOwner {
        country: String,
        currency: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active_venue_id: Option<Uuid>,
    },
    Admin {
        #[serde(default)]
        permissions: Vec<String>,
    },
}

impl RoleProfile {
    pub fn role(&self) -> UserRole {
        match self {
            RoleProfile::Customer { .. } => UserRole::Customer,
            RoleProfile::VenueOwner { .. } => UserRole::VenueOwner,
            RoleProfile::Admin { .. } => UserRole::Admin,
        }
    }
}

impl Model {
    /// Checks the declared field rules, returning every violation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        validation::check_not_blank("name", &self.name, &mut errors);
        validation::check_not_blank("externalId", &self.external_id, &mut errors);
        if let Some(email) = self.email.as_deref()
            && !validation::is_email(email)
        {
            errors.push("email must be a valid email address".to_string());
        }

        match &self.role_profile {
            Some(profile) if profile.role() != self.role => {
                errors.push(format!(
                    "role profile '{}' does not match role '{}'",
                    profile.role().as_str(),
                    self.role.as_str()
                ));
            }
            Some(RoleProfile::VenueOwner {
                country, currency, ..
            }) => {
                validation::check_country("country", country, &mut errors);
                validation::check_currency("currency", currency, &mut errors);
            }
            Some(RoleProfile::Customer {
                username,
                phone_number,
            }) => {
                validation::check_not_blank("username", username, &mut errors);
                validation::check_not_blank("phoneNumber", phone_number, &mut errors);
            }
            Some(RoleProfile::Admin { .. }) | None => {}
        }

        validation::finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, role_profile: Option<RoleProfile>) -> Model {
        Model {
            id: Uuid::new_v4(),
            external_id: "uid-1".to_string(),
            name: "Sam".to_string(),
            email: Some("sam@turfy.io".to_string()),
            profile_picture: String::new(),
            role,
            verified: false,
            role_profile,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn role_profile_is_tagged_by_role() {
        let profile = RoleProfile::VenueOwner {
            country: "GB".to_string(),
            currency: "GBP".to_string(),
            active_venue_id: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "venue-owner");
        assert_eq!(json["currency"], "GBP");

        let parsed: RoleProfile =
            serde_json::from_value(serde_json::json!({"role": "admin"})).unwrap();
        assert_eq!(parsed, RoleProfile::Admin { permissions: vec![] });
    }

    #[test]
    fn mismatched_profile_is_rejected() {
        let invalid = user(
            UserRole::Admin,
            Some(RoleProfile::Customer {
                username: "sam".to_string(),
                phone_number: "0700".to_string(),
            }),
        );
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn venue_owner_codes_are_checked() {
        let invalid = user(
            UserRole::VenueOwner,
            Some(RoleProfile::VenueOwner {
                country: "gb".to_string(),
                currency: "POUND".to_string(),
                active_venue_id: None,
            }),
        );
        assert_eq!(invalid.validate().unwrap_err().len(), 2);

        let mut no_email = user(UserRole::VenueOwner, None);
        no_email.email = None;
        assert!(no_email.validate().is_ok());
    }
}
