//! # Venue Repository
//!
//! Persistence for venues: filtered page listing, dashboard counters, name
//! search and the single-column writes used by the lifecycle orchestrator.
//! Status and soft-delete writes never touch each other's column.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::StringList;
use crate::models::user;
use crate::models::venue::{
    self, Entity as Venue, Managers, PendingMedia, PendingMediaList, ProvisioningState,
    RatingDistribution, VenueStatus,
};

/// Fixed page size of the venue list
pub const PAGE_SIZE: u64 = 10;
/// Maximum number of name search results
pub const SEARCH_LIMIT: u64 = 10;

/// Which venues a listing includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every non-deleted venue
    #[default]
    All,
    /// Soft-deleted venues of any status
    Deleted,
    /// Non-deleted venues with this status
    Only(VenueStatus),
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "deleted" => Some(Self::Deleted),
            other => VenueStatus::parse(other).map(Self::Only),
        }
    }

    fn condition(self) -> Condition {
        match self {
            Self::All => Condition::all().add(venue::Column::DeletedAt.is_null()),
            Self::Deleted => Condition::all().add(venue::Column::DeletedAt.is_not_null()),
            Self::Only(status) => Condition::all()
                .add(venue::Column::Status.eq(status))
                .add(venue::Column::DeletedAt.is_null()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    CreatedAt,
    UpdatedAt,
    Country,
    Status,
    CommissionPercentage,
    RatingAverage,
}

impl SortField {
    fn column(self) -> venue::Column {
        match self {
            Self::Name => venue::Column::Name,
            Self::CreatedAt => venue::Column::CreatedAt,
            Self::UpdatedAt => venue::Column::UpdatedAt,
            Self::Country => venue::Column::Country,
            Self::Status => venue::Column::Status,
            Self::CommissionPercentage => venue::Column::CommissionPercentage,
            Self::RatingAverage => venue::Column::RatingAverage,
        }
    }
}

/// `field_direction`, e.g. `createdAt_desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for VenueSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl VenueSort {
    pub fn parse(value: &str) -> Option<Self> {
        let (field, direction) = value.rsplit_once('_')?;
        let field = match field {
            "name" => SortField::Name,
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "country" => SortField::Country,
            "status" => SortField::Status,
            "commissionPercentage" => SortField::CommissionPercentage,
            "ratingAverage" => SortField::RatingAverage,
            _ => return None,
        };
        let descending = match direction {
            "asc" => false,
            "desc" => true,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    fn order(&self) -> Order {
        if self.descending { Order::Desc } else { Order::Asc }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring of name or address
    pub q: Option<String>,
    pub country: Option<String>,
    pub sort: VenueSort,
    /// 1-based
    pub page: u64,
}

impl Default for VenueFilter {
    fn default() -> Self {
        Self {
            status: StatusFilter::default(),
            q: None,
            country: None,
            sort: VenueSort::default(),
            page: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VenuePage {
    pub venues: Vec<venue::Model>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Venue count for one country code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, FromQueryResult)]
pub struct CountryCount {
    pub code: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueStats {
    pub total_count: u64,
    pub pending_count: u64,
    pub approved_count: u64,
    pub rejected_count: u64,
    pub deleted_count: u64,
    pub countries: Vec<CountryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, FromQueryResult)]
pub struct VenueSummary {
    pub id: Uuid,
    pub name: String,
}

/// Fields written by the first insert of venue creation
#[derive(Debug, Clone, Default)]
pub struct NewVenue {
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub country: String,
    pub currency: String,
    pub longitude: f64,
    pub latitude: f64,
    pub amenities: Vec<String>,
    pub sports_types: Vec<String>,
    pub commission_percentage: f64,
    /// Image URLs in submission order
    pub images: Vec<String>,
    /// Entries of `images` still to be moved out of the temporary namespace
    pub pending_media: Vec<PendingMedia>,
}

/// Editable venue fields; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub commission_percentage: Option<f64>,
    pub status: Option<VenueStatus>,
    pub is_enabled: Option<bool>,
    pub sports_types: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
}

impl VenuePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `LOWER(column) LIKE LOWER('%q%')`. Both sides fold in SQL so the backend
/// applies the same case mapping to the column and the pattern.
fn contains_ignore_case(column: venue::Column, q: &str) -> SimpleExpr {
    let escaped = q
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_");
    Expr::cust_with_exprs(
        "$1 LIKE $2 ESCAPE '!'",
        [
            SimpleExpr::from(Func::lower(Expr::col(column))),
            SimpleExpr::from(Func::lower(Expr::val(format!("%{escaped}%")))),
        ],
    )
}

/// Repository for venue database operations
pub struct VenueRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VenueRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a pending, enabled venue with zeroed ratings. Temporary images
    /// are recorded in `pending_media` so an interrupted create can resume.
    pub async fn insert(&self, new: NewVenue) -> Result<venue::Model, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let model = venue::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(new.owner_id),
            name: Set(new.name),
            description: Set(new.description),
            address: Set(new.address),
            country: Set(new.country),
            currency: Set(new.currency),
            longitude: Set(new.longitude),
            latitude: Set(new.latitude),
            amenities: Set(StringList(new.amenities)),
            sports_types: Set(StringList(new.sports_types)),
            images: Set(StringList(new.images)),
            commission_percentage: Set(new.commission_percentage),
            stripe_account_id: Set(None),
            stripe_onboarding_complete: Set(false),
            status: Set(VenueStatus::Pending),
            is_enabled: Set(true),
            deleted_at: Set(None),
            rating_average: Set(0.0),
            rating_count: Set(0),
            rating_distribution: Set(RatingDistribution::default()),
            managers: Set(Managers::default()),
            media_provisioning: Set(ProvisioningState::Pending),
            payment_provisioning: Set(ProvisioningState::Pending),
            pending_media: Set(
                (!new.pending_media.is_empty()).then_some(PendingMediaList(new.pending_media)),
            ),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<venue::Model>, RepositoryError> {
        Venue::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Fetches a venue along with its owner, if the owner still exists.
    pub async fn find_with_owner(
        &self,
        id: Uuid,
    ) -> Result<Option<(venue::Model, Option<user::Model>)>, RepositoryError> {
        Venue::find_by_id(id)
            .find_also_related(user::Entity)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn require(&self, id: Uuid) -> Result<venue::Model, RepositoryError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Venue not found"))
    }

    pub async fn list(&self, filter: &VenueFilter) -> Result<VenuePage, RepositoryError> {
        let mut condition = filter.status.condition();

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(contains_ignore_case(venue::Column::Name, q))
                    .add(contains_ignore_case(venue::Column::Address, q)),
            );
        }

        if let Some(country) = filter.country.as_deref().filter(|c| !c.is_empty()) {
            condition = condition.add(venue::Column::Country.eq(country));
        }

        let order = filter.sort.order();
        let paginator = Venue::find()
            .filter(condition)
            .order_by(filter.sort.field.column(), order.clone())
            .order_by(venue::Column::Id, order)
            .paginate(self.db, PAGE_SIZE);

        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(RepositoryError::database_error)?;

        let current_page = filter.page.max(1);
        let venues = paginator
            .fetch_page(current_page - 1)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(VenuePage {
            venues,
            total_count: totals.number_of_items,
            total_pages: totals.number_of_pages,
            current_page,
        })
    }

    async fn count(&self, condition: Condition) -> Result<u64, RepositoryError> {
        Venue::find()
            .filter(condition)
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn stats(&self) -> Result<VenueStats, RepositoryError> {
        let total_count = self.count(Condition::all()).await?;
        let pending_count = self
            .count(StatusFilter::Only(VenueStatus::Pending).condition())
            .await?;
        let approved_count = self
            .count(StatusFilter::Only(VenueStatus::Approved).condition())
            .await?;
        let rejected_count = self
            .count(StatusFilter::Only(VenueStatus::Rejected).condition())
            .await?;
        let deleted_count = self.count(StatusFilter::Deleted.condition()).await?;

        let mut countries = Venue::find()
            .select_only()
            .column_as(venue::Column::Country, "code")
            .column_as(Expr::col(venue::Column::Id).count(), "count")
            .group_by(venue::Column::Country)
            .into_model::<CountryCount>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        countries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));

        Ok(VenueStats {
            total_count,
            pending_count,
            approved_count,
            rejected_count,
            deleted_count,
            countries,
        })
    }

    /// Case-insensitive name lookup, soft-deleted venues included.
    pub async fn search(&self, q: &str) -> Result<Vec<VenueSummary>, RepositoryError> {
        Venue::find()
            .select_only()
            .column(venue::Column::Id)
            .column(venue::Column::Name)
            .filter(contains_ignore_case(venue::Column::Name, q))
            .order_by_asc(venue::Column::Name)
            .limit(SEARCH_LIMIT)
            .into_model::<VenueSummary>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: VenueStatus,
    ) -> Result<venue::Model, RepositoryError> {
        let mut model = self.require(id).await?.into_active_model();
        model.status = Set(status);
        model.updated_at = Set(Utc::now().fixed_offset());
        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: VenuePatch,
    ) -> Result<venue::Model, RepositoryError> {
        let existing = self.require(id).await?;
        if patch.is_empty() {
            return Ok(existing);
        }

        let mut model = existing.into_active_model();
        if let Some(name) = patch.name {
            model.name = Set(name);
        }
        if let Some(description) = patch.description {
            model.description = Set(description);
        }
        if let Some(commission) = patch.commission_percentage {
            model.commission_percentage = Set(commission);
        }
        if let Some(status) = patch.status {
            model.status = Set(status);
        }
        if let Some(is_enabled) = patch.is_enabled {
            model.is_enabled = Set(is_enabled);
        }
        if let Some(sports_types) = patch.sports_types {
            model.sports_types = Set(StringList(sports_types));
        }
        if let Some(amenities) = patch.amenities {
            model.amenities = Set(StringList(amenities));
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Sets `deleted_at` to now; a second delete refreshes the timestamp.
    pub async fn soft_delete(&self, id: Uuid) -> Result<venue::Model, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let mut model = self.require(id).await?.into_active_model();
        model.deleted_at = Set(Some(now));
        model.updated_at = Set(now);
        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn restore(&self, id: Uuid) -> Result<venue::Model, RepositoryError> {
        let mut model = self.require(id).await?.into_active_model();
        model.deleted_at = Set(None);
        model.updated_at = Set(Utc::now().fixed_offset());
        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Persists the outcome of the image relocation leg.
    pub async fn record_media(
        &self,
        id: Uuid,
        images: Vec<String>,
        pending: Vec<PendingMedia>,
        state: ProvisioningState,
    ) -> Result<venue::Model, RepositoryError> {
        let mut model = self.require(id).await?.into_active_model();
        model.images = Set(StringList(images));
        model.pending_media = Set((!pending.is_empty()).then_some(PendingMediaList(pending)));
        model.media_provisioning = Set(state);
        model.updated_at = Set(Utc::now().fixed_offset());
        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Persists the outcome of the payment account leg.
    pub async fn record_payment(
        &self,
        id: Uuid,
        account_id: Option<String>,
        state: ProvisioningState,
    ) -> Result<venue::Model, RepositoryError> {
        let mut model = self.require(id).await?.into_active_model();
        if let Some(account_id) = account_id {
            model.stripe_account_id = Set(Some(account_id));
        }
        model.payment_provisioning = Set(state);
        model.updated_at = Set(Utc::now().fixed_offset());
        model
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
