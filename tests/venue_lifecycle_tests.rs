//! Venue lifecycle behavior against an in-memory database and fake integrations.

mod test_utils;

use std::sync::Arc;

use sea_orm::EntityTrait;
use turfy_admin::error::RepositoryError;
use turfy_admin::models::Venue;
use turfy_admin::models::user::UserRole;
use turfy_admin::models::venue::{ProvisioningState, VenueStatus};
use turfy_admin::repositories::VenueRepository;
use turfy_admin::venue_lifecycle::{CreateVenueInput, ImageInput, StoredImage, UpdateVenueInput};
use uuid::Uuid;

use test_utils::{FakePayments, FakeStorage, insert_user, lifecycle_with, setup_test_db};

fn pitch_a(owner_id: Uuid) -> CreateVenueInput {
    CreateVenueInput {
        name: Some("Pitch A".to_string()),
        address: Some("1 High St".to_string()),
        country: Some("GB".to_string()),
        currency: Some("GBP".to_string()),
        owner_id: Some(owner_id),
        longitude: Some(-0.12),
        latitude: Some(51.5),
        commission_percentage: Some(10.0),
        ..Default::default()
    }
}

fn temp_image(name: &str) -> ImageInput {
    ImageInput::Stored(StoredImage {
        url: format!("https://cdn.test/venues/temp/{name}"),
        storage_key: Some(format!("venues/temp/{name}")),
    })
}

#[tokio::test]
async fn pitch_a_is_created_pending_with_payment_account() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let payments = Arc::new(FakePayments::default());
    let lifecycle = lifecycle_with(&db, Arc::new(FakeStorage::default()), payments.clone());

    let venue = lifecycle.create(pitch_a(owner.id)).await.unwrap();

    assert_eq!(venue.status, VenueStatus::Pending);
    assert!(venue.images.0.is_empty());
    assert!(!venue.stripe_onboarding_complete);
    assert!(venue.deleted_at.is_none());
    assert_eq!(venue.stripe_account_id.as_deref(), Some("acct_test_1"));
    assert_eq!(venue.payment_provisioning, ProvisioningState::Completed);
    assert_eq!(venue.media_provisioning, ProvisioningState::Skipped);

    let requests = payments.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].email, "olive@turfy.io");
    assert_eq!(requests[0].company_name, "Pitch A");
    assert_eq!(requests[0].venue_id, venue.id);
    assert_eq!(requests[0].owner_id, owner.id);
}

#[tokio::test]
async fn owner_without_email_is_rejected_and_nothing_persisted() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Nomail", None, UserRole::VenueOwner)
        .await
        .unwrap();
    let payments = Arc::new(FakePayments::default());
    let lifecycle = lifecycle_with(&db, Arc::new(FakeStorage::default()), payments.clone());

    let err = lifecycle.create(pitch_a(owner.id)).await.unwrap_err();

    assert!(
        matches!(&err, RepositoryError::Validation(messages) if messages == &["Venue owner email not found".to_string()])
    );
    assert!(Venue::find().all(&db).await.unwrap().is_empty());
    assert_eq!(payments.request_count(), 0);
}

#[tokio::test]
async fn unknown_owner_is_not_found() {
    let db = setup_test_db().await.unwrap();
    let lifecycle = lifecycle_with(
        &db,
        Arc::new(FakeStorage::default()),
        Arc::new(FakePayments::default()),
    );

    let err = lifecycle.create(pitch_a(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(message) if message == "Venue owner not found"));
}

#[tokio::test]
async fn bad_country_and_currency_are_rejected_before_persistence() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let lifecycle = lifecycle_with(
        &db,
        Arc::new(FakeStorage::default()),
        Arc::new(FakePayments::default()),
    );

    let input = CreateVenueInput {
        country: Some("GBR".to_string()),
        currency: Some("gbp".to_string()),
        ..pitch_a(owner.id)
    };
    let err = lifecycle.create(input).await.unwrap_err();

    let RepositoryError::Validation(messages) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(messages.len(), 2);
    assert!(Venue::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn failing_payment_leaves_venue_without_account() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let payments = Arc::new(FakePayments::default());
    payments.set_failing(true);
    let lifecycle = lifecycle_with(&db, Arc::new(FakeStorage::default()), payments.clone());

    let venue = lifecycle.create(pitch_a(owner.id)).await.unwrap();

    assert!(venue.stripe_account_id.is_none());
    assert_eq!(venue.payment_provisioning, ProvisioningState::Failed);
    let stored = Venue::find_by_id(venue.id).one(&db).await.unwrap().unwrap();
    assert!(stored.stripe_account_id.is_none());

    // Retrying once the processor recovers stores the account
    payments.set_failing(false);
    let retried = lifecycle.retry_provisioning(venue.id).await.unwrap();
    assert_eq!(retried.stripe_account_id.as_deref(), Some("acct_test_1"));
    assert_eq!(retried.payment_provisioning, ProvisioningState::Completed);
    assert_eq!(payments.request_count(), 2);

    // Completed legs are not re-run
    lifecycle.retry_provisioning(venue.id).await.unwrap();
    assert_eq!(payments.request_count(), 2);
}

#[tokio::test]
async fn one_failing_relocation_keeps_its_original_url() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let storage = Arc::new(FakeStorage::default());
    storage.fail_key("venues/temp/b.jpg");
    let lifecycle = lifecycle_with(&db, storage.clone(), Arc::new(FakePayments::default()));

    let input = CreateVenueInput {
        images: Some(vec![
            temp_image("a.jpg"),
            temp_image("b.jpg"),
            ImageInput::Url("https://elsewhere.test/c.jpg".to_string()),
            temp_image("d.jpg"),
        ]),
        ..pitch_a(owner.id)
    };
    let venue = lifecycle.create(input).await.unwrap();
    let folder = format!("venues/{}", venue.id);

    assert_eq!(
        venue.images.0,
        vec![
            FakeStorage::url_for(&format!("{folder}/a.jpg")),
            "https://cdn.test/venues/temp/b.jpg".to_string(),
            "https://elsewhere.test/c.jpg".to_string(),
            FakeStorage::url_for(&format!("{folder}/d.jpg")),
        ]
    );
    assert_eq!(venue.media_provisioning, ProvisioningState::Failed);
    let pending = venue.pending_media.clone().unwrap().0;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].position, 1);
    assert_eq!(storage.renames.lock().unwrap().len(), 2);

    // Retry after storage recovers replaces the fallback URL in place
    storage.heal_key("venues/temp/b.jpg");
    let retried = lifecycle.retry_provisioning(venue.id).await.unwrap();
    assert_eq!(
        retried.images.0[1],
        FakeStorage::url_for(&format!("{folder}/b.jpg"))
    );
    assert_eq!(retried.images.0.len(), 4);
    assert_eq!(retried.media_provisioning, ProvisioningState::Completed);
    assert!(retried.pending_media.is_none());
}

#[tokio::test]
async fn interrupted_create_is_finished_by_retry() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let storage = Arc::new(FakeStorage::default());
    let payments = Arc::new(FakePayments::default());
    let lifecycle = lifecycle_with(&db, storage.clone(), payments.clone());

    // Only the first write of a create landed
    let new_venue = CreateVenueInput {
        images: Some(vec![
            ImageInput::Url("https://elsewhere.test/a.jpg".to_string()),
            temp_image("b.jpg"),
        ]),
        ..pitch_a(owner.id)
    }
    .validate()
    .unwrap();
    let stuck = VenueRepository::new(&db).insert(new_venue).await.unwrap();

    assert_eq!(stuck.media_provisioning, ProvisioningState::Pending);
    assert_eq!(stuck.payment_provisioning, ProvisioningState::Pending);
    assert_eq!(
        stuck.images.0[1],
        "https://cdn.test/venues/temp/b.jpg".to_string()
    );
    assert_eq!(stuck.pending_media.clone().unwrap().0[0].position, 1);

    let retried = lifecycle.retry_provisioning(stuck.id).await.unwrap();

    assert_eq!(retried.stripe_account_id.as_deref(), Some("acct_test_1"));
    assert_eq!(retried.payment_provisioning, ProvisioningState::Completed);
    assert_eq!(retried.media_provisioning, ProvisioningState::Completed);
    assert_eq!(
        retried.images.0,
        vec![
            "https://elsewhere.test/a.jpg".to_string(),
            FakeStorage::url_for(&format!("venues/{}/b.jpg", stuck.id)),
        ]
    );
    assert!(retried.pending_media.is_none());
    assert_eq!(payments.request_count(), 1);
    assert_eq!(storage.renames.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn status_change_on_deleted_venue_keeps_it_deleted() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let lifecycle = lifecycle_with(
        &db,
        Arc::new(FakeStorage::default()),
        Arc::new(FakePayments::default()),
    );
    let venue = lifecycle.create(pitch_a(owner.id)).await.unwrap();

    let deleted = lifecycle.soft_delete(venue.id).await.unwrap();
    assert_eq!(deleted.status, VenueStatus::Pending);
    let deleted_at = Venue::find_by_id(venue.id)
        .one(&db)
        .await
        .unwrap()
        .and_then(|v| v.deleted_at)
        .unwrap();

    let approved = lifecycle
        .update(
            venue.id,
            UpdateVenueInput {
                status: Some(VenueStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.status, VenueStatus::Approved);
    assert_eq!(approved.deleted_at, Some(deleted_at));

    let restored = lifecycle.restore(venue.id).await.unwrap();
    assert!(restored.deleted_at.is_none());
    assert_eq!(restored.status, VenueStatus::Approved);
}

#[tokio::test]
async fn field_update_changes_only_supplied_fields() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let lifecycle = lifecycle_with(
        &db,
        Arc::new(FakeStorage::default()),
        Arc::new(FakePayments::default()),
    );
    let venue = lifecycle.create(pitch_a(owner.id)).await.unwrap();

    let updated = lifecycle
        .update(
            venue.id,
            UpdateVenueInput {
                name: Some("  Pitch B ".to_string()),
                commission_percentage: Some(12.5),
                is_enabled: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Pitch B");
    assert_eq!(updated.commission_percentage, 12.5);
    assert!(!updated.is_enabled);
    assert_eq!(updated.address, venue.address);
    assert_eq!(updated.status, VenueStatus::Pending);
}

#[tokio::test]
async fn get_returns_owner_summary() {
    let db = setup_test_db().await.unwrap();
    let owner = insert_user(&db, "Olive", Some("olive@turfy.io"), UserRole::VenueOwner)
        .await
        .unwrap();
    let lifecycle = lifecycle_with(
        &db,
        Arc::new(FakeStorage::default()),
        Arc::new(FakePayments::default()),
    );
    let venue = lifecycle.create(pitch_a(owner.id)).await.unwrap();

    let (found, found_owner) = lifecycle.get(venue.id).await.unwrap();
    assert_eq!(found.id, venue.id);
    assert_eq!(found_owner.map(|o| o.id), Some(owner.id));

    let missing = lifecycle.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(missing, RepositoryError::NotFound(_)));
}
