//! # Data Models
//!
//! SeaORM entities for the admin API. Venues, users and the reference catalogs
//! back the HTTP surface; the booking-domain entities are schema only.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod amenity;
pub mod booking;
pub mod discount;
pub mod facility;
pub mod holiday;
pub mod notification;
pub mod payment;
pub mod refund;
pub mod reservation;
pub mod review;
pub mod sports_type;
pub mod user;
pub mod venue;

pub use amenity::Entity as Amenity;
pub use booking::Entity as Booking;
pub use discount::Entity as Discount;
pub use facility::Entity as Facility;
pub use holiday::Entity as Holiday;
pub use notification::Entity as Notification;
pub use payment::Entity as Payment;
pub use refund::Entity as Refund;
pub use reservation::Entity as Reservation;
pub use review::Entity as Review;
pub use sports_type::Entity as SportsType;
pub use user::Entity as User;
pub use venue::Entity as Venue;

/// A JSON array of strings stored in a single column
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl From<Vec<String>> for StringList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "turfy-admin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
