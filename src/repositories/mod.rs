//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for database entities, providing a clean API for data access.

pub mod reference_data;
pub mod user;
pub mod venue;

pub use reference_data::ReferenceDataRepository;
pub use user::{NewUser, UserRepository};
pub use venue::{
    NewVenue, StatusFilter, VenueFilter, VenuePage, VenuePatch, VenueRepository, VenueSort,
    VenueStats, VenueSummary,
};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use uuid::Uuid;

    use crate::models::user::{self, UserRole};

    /// Fresh in-memory SQLite database with all migrations applied
    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    pub async fn insert_user(
        db: &DatabaseConnection,
        name: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> user::Model {
        let now = Utc::now().fixed_offset();
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(format!("uid-{}", Uuid::new_v4().simple())),
            name: Set(name.to_string()),
            email: Set(email.map(str::to_string)),
            profile_picture: Set(String::new()),
            role: Set(role),
            verified: Set(true),
            role_profile: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .unwrap()
    }
}
