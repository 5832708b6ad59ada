//! User repository for database operations

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{self, Entity as User, RoleProfile, UserRole};

/// Fields required to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub role_profile: Option<RoleProfile>,
}

/// Repository for user database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and inserts a user
    pub async fn create(&self, new: NewUser) -> Result<user::Model, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let model = user::Model {
            id: Uuid::new_v4(),
            external_id: new.external_id,
            name: new.name,
            email: new.email,
            profile_picture: String::new(),
            role: new.role,
            verified: false,
            role_profile: new.role_profile,
            created_at: now,
            updated_at: now,
        };
        model
            .validate()
            .map_err(RepositoryError::validation_error)?;

        user::ActiveModel::from(model)
            .reset_all()
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, RepositoryError> {
        User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, RepositoryError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Venue owners ordered by name, for the owner picker.
    pub async fn list_venue_owners(&self) -> Result<Vec<user::Model>, RepositoryError> {
        User::find()
            .filter(user::Column::Role.eq(UserRole::VenueOwner))
            .order_by_asc(user::Column::Name)
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_db;

    fn owner(name: &str, email: Option<&str>) -> NewUser {
        NewUser {
            external_id: format!("uid-{name}"),
            name: name.to_string(),
            email: email.map(str::to_string),
            role: UserRole::VenueOwner,
            role_profile: Some(RoleProfile::VenueOwner {
                country: "GB".to_string(),
                currency: "GBP".to_string(),
                active_venue_id: None,
            }),
        }
    }

    #[tokio::test]
    async fn venue_owners_are_sorted_by_name() {
        let db = setup_db().await;
        let repo = UserRepository::new(&db);

        repo.create(owner("Zara", Some("zara@turfy.io"))).await.unwrap();
        repo.create(owner("Abe", None)).await.unwrap();
        repo.create(NewUser {
            external_id: "uid-admin".to_string(),
            name: "Admin".to_string(),
            email: Some("admin@turfy.io".to_string()),
            role: UserRole::Admin,
            role_profile: None,
        })
        .await
        .unwrap();

        let names: Vec<_> = repo
            .list_venue_owners()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, ["Abe", "Zara"]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_profile() {
        let db = setup_db().await;
        let repo = UserRepository::new(&db);

        let mut invalid = owner("Olive", Some("olive@turfy.io"));
        invalid.role_profile = Some(RoleProfile::VenueOwner {
            country: "gb".to_string(),
            currency: "GBP".to_string(),
            active_venue_id: None,
        });

        assert!(matches!(
            repo.create(invalid).await,
            Err(RepositoryError::Validation(_))
        ));
        assert!(repo.find_by_email("olive@turfy.io").await.unwrap().is_none());
    }
}
