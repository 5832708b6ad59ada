//! # Venue Lifecycle
//!
//! Orchestrates venue creation across the database, object storage and the
//! payment processor, plus the admin state changes on existing venues.
//!
//! Creation is three independent writes: the venue row (with its submitted
//! images and the temporary ones still to move), its relocated image list, and
//! its payment account id. Only validation, a missing owner and database
//! failures abort; storage and payment failures degrade the venue and are
//! recorded per leg. [`VenueLifecycle::retry_provisioning`] finishes any leg
//! left `failed`, or left `pending` by a create that never got past its first
//! write.

use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::media::{self, MediaService};
use crate::models::user;
use crate::models::venue::{self, PendingMedia, ProvisioningState, VenueStatus};
use crate::payments::PaymentAccountProvisioner;
use crate::repositories::{
    NewVenue, UserRepository, VenueFilter, VenuePage, VenuePatch, VenueRepository, VenueStats,
    VenueSummary,
};
use crate::validation;

/// An image supplied at creation: a bare URL, or an uploaded object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ImageInput {
    Url(String),
    Stored(StoredImage),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    #[serde(default, alias = "publicId")]
    pub storage_key: Option<String>,
}

/// Body of a create request; presence and format are checked together so
/// every problem is reported at once
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenueInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    #[schema(example = "GB")]
    pub country: Option<String>,
    #[schema(example = "GBP")]
    pub currency: Option<String>,
    pub owner_id: Option<Uuid>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub commission_percentage: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub sports_types: Option<Vec<String>>,
    pub images: Option<Vec<ImageInput>>,
}

impl ImageInput {
    fn into_parts(self) -> (String, Option<String>) {
        match self {
            Self::Url(url) => (url, None),
            Self::Stored(StoredImage { url, storage_key }) => (url, storage_key),
        }
    }
}

fn required<'a>(field: &str, value: &'a Option<String>, errors: &mut Vec<String>) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.push(format!("{field} is required"));
            ""
        }
    }
}

fn required_number(field: &str, value: Option<f64>, min: f64, max: f64, errors: &mut Vec<String>) -> f64 {
    match value {
        Some(v) => {
            validation::check_range(field, v, min, max, errors);
            v
        }
        None => {
            errors.push(format!("{field} is required"));
            0.0
        }
    }
}

impl CreateVenueInput {
    /// Builds the first insert; temporary images become `pending_media` entries.
    pub fn validate(self) -> Result<NewVenue, Vec<String>> {
        let mut errors = Vec::new();

        let name = required("name", &self.name, &mut errors).to_string();
        let address = required("address", &self.address, &mut errors).to_string();
        let country = required("country", &self.country, &mut errors).to_string();
        let currency = required("currency", &self.currency, &mut errors).to_string();
        if self.owner_id.is_none() {
            errors.push("ownerId is required".to_string());
        }

        if !country.is_empty() {
            validation::check_country("country", &country, &mut errors);
        }
        if !currency.is_empty() {
            validation::check_currency("currency", &currency, &mut errors);
        }

        let longitude = required_number("longitude", self.longitude, -180.0, 180.0, &mut errors);
        let latitude = required_number("latitude", self.latitude, -90.0, 90.0, &mut errors);
        let commission_percentage = required_number(
            "commissionPercentage",
            self.commission_percentage,
            0.0,
            100.0,
            &mut errors,
        );

        validation::finish(errors)?;

        let mut images = Vec::new();
        let mut pending_media = Vec::new();
        for (position, image) in self.images.unwrap_or_default().into_iter().enumerate() {
            let (url, storage_key) = image.into_parts();
            if let Some(storage_key) = storage_key.filter(|key| media::is_temporary(key)) {
                pending_media.push(PendingMedia {
                    position,
                    url: url.clone(),
                    storage_key,
                });
            }
            images.push(url);
        }

        Ok(NewVenue {
            owner_id: self.owner_id.unwrap_or_default(),
            name,
            description: self.description.unwrap_or_default(),
            address,
            country,
            currency,
            longitude,
            latitude,
            amenities: self.amenities.unwrap_or_default(),
            sports_types: self.sports_types.unwrap_or_default(),
            commission_percentage,
            images,
            pending_media,
        })
    }
}

/// Edit-screen patch. Absent fields are left unchanged; the owner cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVenueInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub commission_percentage: Option<f64>,
    pub status: Option<VenueStatus>,
    pub is_enabled: Option<bool>,
    pub sports_types: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
}

impl UpdateVenueInput {
    pub fn validate(self) -> Result<VenuePatch, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.map(|n| n.trim().to_string());
        if let Some(name) = name.as_deref() {
            validation::check_not_blank("name", name, &mut errors);
        }
        if let Some(commission) = self.commission_percentage {
            validation::check_range("commissionPercentage", commission, 0.0, 100.0, &mut errors);
        }

        validation::finish(errors)?;

        Ok(VenuePatch {
            name,
            description: self.description,
            commission_percentage: self.commission_percentage,
            status: self.status,
            is_enabled: self.is_enabled,
            sports_types: self.sports_types,
            amenities: self.amenities,
        })
    }
}

fn media_state(attempted: usize, failed: usize) -> ProvisioningState {
    if failed > 0 {
        ProvisioningState::Failed
    } else if attempted > 0 {
        ProvisioningState::Completed
    } else {
        ProvisioningState::Skipped
    }
}

fn outcome_label(state: ProvisioningState) -> &'static str {
    match state {
        ProvisioningState::Pending => "pending",
        ProvisioningState::Completed => "completed",
        ProvisioningState::Failed => "failed",
        ProvisioningState::Skipped => "skipped",
    }
}

fn record_outcome(step: &'static str, state: ProvisioningState) {
    counter!("venue_provisioning_total", "step" => step, "outcome" => outcome_label(state))
        .increment(1);
}

#[derive(Clone)]
pub struct VenueLifecycle {
    db: DatabaseConnection,
    media: MediaService,
    payments: PaymentAccountProvisioner,
}

impl VenueLifecycle {
    pub fn new(
        db: DatabaseConnection,
        media: MediaService,
        payments: PaymentAccountProvisioner,
    ) -> Self {
        Self {
            db,
            media,
            payments,
        }
    }

    fn venues(&self) -> VenueRepository<'_> {
        VenueRepository::new(&self.db)
    }

    /// Creates a pending venue, then relocates its images and provisions its
    /// payment account. The returned venue reflects whatever legs succeeded.
    pub async fn create(&self, input: CreateVenueInput) -> Result<venue::Model, RepositoryError> {
        let new_venue = input.validate().map_err(RepositoryError::validation_error)?;

        let owner = UserRepository::new(&self.db)
            .find_by_id(new_venue.owner_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Venue owner not found"))?;
        let owner_email = owner
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| {
                RepositoryError::validation_error(vec!["Venue owner email not found".to_string()])
            })?;

        let venue = self.venues().insert(new_venue).await?;
        tracing::info!(venue_id = %venue.id, owner_id = %venue.owner_id, "Created pending venue");

        let venue = self.relocate_pending_media(venue).await?;
        self.provision_payment_account(venue, &owner_email).await
    }

    /// Moves every `pending_media` entry into the venue's folder, replacing the
    /// temporary URL at its position. Entries that fail stay pending.
    async fn relocate_pending_media(
        &self,
        venue: venue::Model,
    ) -> Result<venue::Model, RepositoryError> {
        let namespace = venue.id.to_string();
        let mut images = venue.images.0.clone();
        let entries = venue.pending_media.clone().unwrap_or_default().0;
        let attempted = entries.len();
        let mut still_pending = Vec::new();

        for entry in entries {
            match self.media.relocate(&entry.storage_key, &namespace).await {
                Ok(moved) => {
                    if let Some(slot) = images.get_mut(entry.position) {
                        *slot = moved.url;
                    } else {
                        images.push(moved.url);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        venue_id = %venue.id,
                        step = "media",
                        storage_key = %entry.storage_key,
                        error = %err,
                        "Image relocation failed; keeping temporary URL"
                    );
                    still_pending.push(entry);
                }
            }
        }

        let state = media_state(attempted, still_pending.len());
        record_outcome("media", state);
        self.venues()
            .record_media(venue.id, images, still_pending, state)
            .await
    }

    async fn provision_payment_account(
        &self,
        venue: venue::Model,
        owner_email: &str,
    ) -> Result<venue::Model, RepositoryError> {
        let (account_id, state) = match self
            .payments
            .provision(venue.id, venue.owner_id, &venue.name, owner_email)
            .await
        {
            Ok(account_id) => (Some(account_id), ProvisioningState::Completed),
            Err(err) => {
                tracing::warn!(
                    venue_id = %venue.id,
                    step = "payment",
                    error = %err,
                    "Payment account provisioning failed; venue left without account"
                );
                (None, ProvisioningState::Failed)
            }
        };

        record_outcome("payment", state);
        self.venues().record_payment(venue.id, account_id, state).await
    }

    /// Re-runs the provisioning legs that are failed, or still pending after an
    /// interrupted create. Finished legs are left alone.
    pub async fn retry_provisioning(&self, id: Uuid) -> Result<venue::Model, RepositoryError> {
        let mut venue = self
            .venues()
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Venue not found"))?;

        if venue.media_provisioning.is_unfinished() {
            venue = self.relocate_pending_media(venue).await?;
        }

        if venue.payment_provisioning.is_unfinished() && venue.stripe_account_id.is_none()
        {
            let owner = UserRepository::new(&self.db).find_by_id(venue.owner_id).await?;
            match owner.and_then(|owner| owner.email) {
                Some(email) if !email.trim().is_empty() => {
                    venue = self.provision_payment_account(venue, &email).await?;
                }
                _ => {
                    tracing::warn!(
                        venue_id = %venue.id,
                        step = "payment",
                        "Cannot retry payment provisioning: owner or owner email missing"
                    );
                }
            }
        }

        Ok(venue)
    }

    /// Fetches a venue and its owner, if the owner still exists.
    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<(venue::Model, Option<user::Model>), RepositoryError> {
        self.venues()
            .find_with_owner(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Venue not found"))
    }

    pub async fn list(&self, filter: &VenueFilter) -> Result<VenuePage, RepositoryError> {
        self.venues().list(filter).await
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: VenueStatus,
    ) -> Result<venue::Model, RepositoryError> {
        let venue = self.venues().set_status(id, status).await?;
        tracing::info!(venue_id = %id, status = status.as_str(), "Updated venue status");
        Ok(venue)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateVenueInput,
    ) -> Result<venue::Model, RepositoryError> {
        let patch = input.validate().map_err(RepositoryError::validation_error)?;

        if let Some(status) = patch.status
            && patch == (VenuePatch { status: Some(status), ..Default::default() })
        {
            return self.set_status(id, status).await;
        }

        let venue = self.venues().update(id, patch).await?;
        tracing::info!(venue_id = %id, "Updated venue");
        Ok(venue)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<venue::Model, RepositoryError> {
        let venue = self.venues().soft_delete(id).await?;
        tracing::info!(venue_id = %id, "Soft-deleted venue");
        Ok(venue)
    }

    pub async fn restore(&self, id: Uuid) -> Result<venue::Model, RepositoryError> {
        let venue = self.venues().restore(id).await?;
        tracing::info!(venue_id = %id, "Restored venue");
        Ok(venue)
    }

    pub async fn stats(&self) -> Result<VenueStats, RepositoryError> {
        self.venues().stats().await
    }

    pub async fn search(&self, q: &str) -> Result<Vec<VenueSummary>, RepositoryError> {
        self.venues().search(q.trim()).await
    }
}
