//! Reference data seeding
//!
//! Inserts the default sports types and amenities. Existing rows (matched by
//! sports type name or amenity value) are left untouched, so seeding is safe
//! to repeat on every startup.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;

use crate::repositories::ReferenceDataRepository;

/// (name, emoji icon)
const SPORTS_TYPES: &[(&str, &str)] = &[
    ("Football", "⚽"),
    ("Basketball", "🏀"),
    ("Tennis", "🎾"),
    ("Cricket", "🏏"),
    ("Volleyball", "🏐"),
    ("Badminton", "🏸"),
    ("Swimming", "🏊"),
    ("Table Tennis", "🏓"),
    ("Padel", "🎾"),
    ("Squash", "🎾"),
];

/// (name, value, lucide icon)
const AMENITIES: &[(&str, &str, &str)] = &[
    ("Parking", "parking", "car"),
    ("Changing Rooms", "changing-rooms", "shirt"),
    ("Showers", "showers", "shower-head"),
    ("Toilets", "toilets", "bath"),
    ("Cafe", "cafe", "coffee"),
    ("Lighting", "lighting", "lightbulb"),
    ("Equipment Rental", "equipment-rental", "dumbbell"),
    ("WiFi", "wifi", "wifi"),
    ("First Aid", "first-aid", "cross"),
    ("Spectator Area", "spectator-area", "users"),
];

/// Counts of rows inserted by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub sports_types: usize,
    pub amenities: usize,
}

/// Seeds the sports type and amenity catalogs
pub async fn seed_reference_data(db: &DatabaseConnection) -> Result<SeedReport> {
    let repo = ReferenceDataRepository::new(db);
    let mut report = SeedReport::default();

    for (name, icon) in SPORTS_TYPES {
        let inserted = repo
            .ensure_sports_type(name, Some(icon))
            .await
            .with_context(|| format!("Failed to seed sports type '{name}'"))?;
        if inserted {
            tracing::debug!(name, "Seeded sports type");
            report.sports_types += 1;
        }
    }

    for (name, value, icon) in AMENITIES {
        let icon = BTreeMap::from([("lucide".to_string(), icon.to_string())]);
        let inserted = repo
            .ensure_amenity(name, value, icon)
            .await
            .with_context(|| format!("Failed to seed amenity '{value}'"))?;
        if inserted {
            tracing::debug!(value, "Seeded amenity");
            report.amenities += 1;
        }
    }

    tracing::info!(
        sports_types = report.sports_types,
        amenities = report.amenities,
        "Reference data seeded"
    );
    Ok(report)
}
