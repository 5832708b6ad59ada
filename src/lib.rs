//! # Turfy Admin API Library
//!
//! This library provides the core functionality for the Turfy admin API,
//! including the venue lifecycle, integrations, handlers and server configuration.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod integrations;
pub mod media;
pub mod models;
pub mod payments;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub mod validation;
pub mod venue_lifecycle;
pub use migration;
