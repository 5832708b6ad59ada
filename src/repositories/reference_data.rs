//! Reference data repository (amenities and sports types)

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::amenity::{self, AmenityIcon, Entity as Amenity};
use crate::models::sports_type::{self, Entity as SportsType};

pub struct ReferenceDataRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReferenceDataRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_amenities(&self) -> Result<Vec<amenity::Model>, RepositoryError> {
        Amenity::find()
            .order_by_asc(amenity::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_sports_types(&self) -> Result<Vec<sports_type::Model>, RepositoryError> {
        SportsType::find()
            .order_by_asc(sports_type::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Inserts the amenity unless one with the same `value` exists. Returns true when inserted.
    pub async fn ensure_amenity(
        &self,
        name: &str,
        value: &str,
        icon: BTreeMap<String, String>,
    ) -> Result<bool, RepositoryError> {
        let existing = Amenity::find()
            .filter(amenity::Column::Value.eq(value))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Ok(false);
        }

        let now = Utc::now().fixed_offset();
        amenity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            value: Set(value.to_string()),
            icon: Set(AmenityIcon(icon)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;
        Ok(true)
    }

    /// Inserts the sports type unless one with the same name exists. Returns true when inserted.
    pub async fn ensure_sports_type(
        &self,
        name: &str,
        icon: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let existing = SportsType::find()
            .filter(sports_type::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Ok(false);
        }

        sports_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            icon: Set(icon.map(str::to_string)),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_db;

    #[tokio::test]
    async fn ensure_is_idempotent_and_lists_sorted() {
        let db = setup_db().await;
        let repo = ReferenceDataRepository::new(&db);

        assert!(repo.ensure_sports_type("Tennis", None).await.unwrap());
        assert!(repo.ensure_sports_type("Football", Some("ball")).await.unwrap());
        assert!(!repo.ensure_sports_type("Tennis", None).await.unwrap());

        let names: Vec<_> = repo
            .list_sports_types()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Football", "Tennis"]);

        let icon = BTreeMap::from([("lucide".to_string(), "car".to_string())]);
        assert!(repo.ensure_amenity("Parking", "parking", icon.clone()).await.unwrap());
        assert!(!repo.ensure_amenity("Car park", "parking", icon).await.unwrap());

        let amenities = repo.list_amenities().await.unwrap();
        assert_eq!(amenities.len(), 1);
        assert_eq!(amenities[0].icon.0["lucide"], "car");
    }
}
