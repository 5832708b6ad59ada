//! Database migrations for the Turfy admin API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_03_01_000001_create_users;
mod m2025_03_01_000002_create_reference_data;
mod m2025_03_01_000003_create_venues;
mod m2025_03_08_000001_add_venue_provisioning_state;
mod m2025_03_15_000001_create_booking_domain;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_03_01_000001_create_users::Migration),
            Box::new(m2025_03_01_000002_create_reference_data::Migration),
            Box::new(m2025_03_01_000003_create_venues::Migration),
            Box::new(m2025_03_08_000001_add_venue_provisioning_state::Migration),
            Box::new(m2025_03_15_000001_create_booking_domain::Migration),
        ]
    }
}
