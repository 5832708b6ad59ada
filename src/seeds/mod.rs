//! Database seeding functionality
//!
//! This module provides functionality to seed the database with initial data.
//! It includes seeding for the reference catalogs the venue form picks from.

pub mod reference_data;

pub use reference_data::{SeedReport, seed_reference_data};
