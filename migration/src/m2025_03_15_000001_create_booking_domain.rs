//! Migration to create the booking-domain tables (facilities, bookings, reservations,
//! discounts, holidays, payments, refunds, reviews, notifications).
//!
//! Nested documents (segments, policies, opening hours, usage history) live in JSON columns.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Facilities::Table)
                    .if_not_exists()
                    .col(id_col(Facilities::Id))
                    .col(ColumnDef::new(Facilities::VenueId).uuid().not_null())
                    .col(ColumnDef::new(Facilities::Name).string().not_null())
                    .col(
                        ColumnDef::new(Facilities::SportsTypeIds)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Facilities::BookingPolicy)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Facilities::Capacity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Facilities::CapacityType).string().not_null())
                    .col(
                        ColumnDef::new(Facilities::MinBookingDurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Facilities::SlotIncrementMinutes)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(ColumnDef::new(Facilities::MaxBookingDurationMinutes).integer())
                    .col(
                        ColumnDef::new(Facilities::OperatingHours)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Facilities::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(timestamp_col(Facilities::CreatedAt))
                    .col(timestamp_col(Facilities::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(id_col(Bookings::Id))
                    .col(ColumnDef::new(Bookings::VenueId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::FacilityId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Bookings::CustomerName).string())
                    .col(ColumnDef::new(Bookings::CustomerMobile).string())
                    .col(
                        ColumnDef::new(Bookings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Capacity).integer().not_null())
                    .col(ColumnDef::new(Bookings::Segments).json_binary().not_null())
                    .col(ColumnDef::new(Bookings::Subtotal).double().not_null())
                    .col(
                        ColumnDef::new(Bookings::TotalDiscount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Bookings::BookingFee)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Bookings::BookingFeePercentage)
                            .double()
                            .not_null()
                            .default(3.0),
                    )
                    .col(
                        ColumnDef::new(Bookings::VenueCommission)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Bookings::VenueCommissionPercentage)
                            .double()
                            .not_null()
                            .default(10.0),
                    )
                    .col(ColumnDef::new(Bookings::TotalAmount).double().not_null())
                    .col(
                        ColumnDef::new(Bookings::AppliedDiscounts)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::PaymentIntentId).string())
                    .col(ColumnDef::new(Bookings::PaymentId).uuid())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("awaiting_payment"),
                    )
                    .col(
                        ColumnDef::new(Bookings::ApprovalRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Bookings::ApprovalStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::ApprovalNotes).text())
                    .col(ColumnDef::new(Bookings::ApprovedBy).uuid())
                    .col(ColumnDef::new(Bookings::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bookings::AdditionalInfo).text())
                    .col(ColumnDef::new(Bookings::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Bookings::Origin)
                            .string()
                            .not_null()
                            .default("system"),
                    )
                    .col(timestamp_col(Bookings::CreatedAt))
                    .col(timestamp_col(Bookings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-venue_id-start_time")
                    .table(Bookings::Table)
                    .col(Bookings::VenueId)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-status-start_time")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(id_col(Reservations::Id))
                    .col(ColumnDef::new(Reservations::FacilityId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::VenueId).uuid().not_null())
                    .col(
                        ColumnDef::new(Reservations::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::Currency)
                            .string_len(3)
                            .not_null()
                            .default("GBP"),
                    )
                    .col(
                        ColumnDef::new(Reservations::Segments)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Subtotal).double().not_null())
                    .col(
                        ColumnDef::new(Reservations::TotalDiscount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Reservations::FinalAmount).double().not_null())
                    .col(
                        ColumnDef::new(Reservations::BookingFee)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Reservations::BookingFeePercentage)
                            .double()
                            .not_null()
                            .default(3.0),
                    )
                    .col(
                        ColumnDef::new(Reservations::VenueCommission)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Reservations::VenueCommissionPercentage)
                            .double()
                            .not_null()
                            .default(10.0),
                    )
                    .col(ColumnDef::new(Reservations::TotalAmount).double())
                    .col(ColumnDef::new(Reservations::DiscountCode).string())
                    .col(
                        ColumnDef::new(Reservations::DiscountValue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Reservations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Reservations::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::BookingId).uuid())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(timestamp_col(Reservations::CreatedAt))
                    .col(timestamp_col(Reservations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reservations-expires_at")
                    .table(Reservations::Table)
                    .col(Reservations::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Discounts::Table)
                    .if_not_exists()
                    .col(id_col(Discounts::Id))
                    .col(
                        ColumnDef::new(Discounts::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Discounts::Name).string().not_null())
                    .col(ColumnDef::new(Discounts::Description).text())
                    .col(ColumnDef::new(Discounts::DiscountType).string().not_null())
                    .col(ColumnDef::new(Discounts::Value).double().not_null())
                    .col(ColumnDef::new(Discounts::Scope).string().not_null())
                    .col(ColumnDef::new(Discounts::VenueId).uuid().not_null())
                    .col(ColumnDef::new(Discounts::FacilityId).uuid())
                    .col(ColumnDef::new(Discounts::MaxUses).integer())
                    .col(
                        ColumnDef::new(Discounts::UsedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Discounts::MaxUsesPerUser)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Discounts::MinBookingAmount).double())
                    .col(ColumnDef::new(Discounts::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Discounts::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Discounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Discounts::DaysOfWeek).json_binary().not_null())
                    .col(ColumnDef::new(Discounts::TimeSlots).json_binary().not_null())
                    .col(
                        ColumnDef::new(Discounts::UsageHistory)
                            .json_binary()
                            .not_null(),
                    )
                    .col(timestamp_col(Discounts::CreatedAt))
                    .col(timestamp_col(Discounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Holidays::Table)
                    .if_not_exists()
                    .col(id_col(Holidays::Id))
                    .col(ColumnDef::new(Holidays::VenueId).uuid().not_null())
                    .col(ColumnDef::new(Holidays::Name).string().not_null())
                    .col(
                        ColumnDef::new(Holidays::HolidayType)
                            .string()
                            .not_null()
                            .default("public"),
                    )
                    .col(ColumnDef::new(Holidays::Date).timestamp_with_time_zone())
                    .col(ColumnDef::new(Holidays::RecurringMonth).integer())
                    .col(ColumnDef::new(Holidays::RecurringDay).integer())
                    .col(ColumnDef::new(Holidays::FacilityIds).json_binary().not_null())
                    .col(
                        ColumnDef::new(Holidays::OperatingHours)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Holidays::IsFullDayClosure)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Holidays::Notes).text())
                    .col(timestamp_col(Holidays::CreatedAt))
                    .col(timestamp_col(Holidays::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(id_col(Payments::Id))
                    .col(ColumnDef::new(Payments::BookingId).uuid().not_null())
                    .col(ColumnDef::new(Payments::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Payments::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Payments::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Payments::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Payments::Transaction).string().unique_key())
                    .col(ColumnDef::new(Payments::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Payments::DiscountId).uuid())
                    .col(timestamp_col(Payments::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Refunds::Table)
                    .if_not_exists()
                    .col(id_col(Refunds::Id))
                    .col(ColumnDef::new(Refunds::BookingId).uuid().not_null())
                    .col(ColumnDef::new(Refunds::PaymentId).uuid().not_null())
                    .col(ColumnDef::new(Refunds::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Refunds::Status)
                            .string()
                            .not_null()
                            .default("initiated"),
                    )
                    .col(ColumnDef::new(Refunds::Reason).string_len(500))
                    .col(timestamp_col(Refunds::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(id_col(Reviews::Id))
                    .col(ColumnDef::new(Reviews::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::VenueId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::FacilityId).uuid().not_null())
                    .col(
                        ColumnDef::new(Reviews::BookingId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(ColumnDef::new(Reviews::Title).string_len(100))
                    .col(ColumnDef::new(Reviews::Comment).string_len(1000))
                    .col(ColumnDef::new(Reviews::Attributes).json_binary())
                    .col(ColumnDef::new(Reviews::VerificationDetails).json_binary())
                    .col(
                        ColumnDef::new(Reviews::HelpfulCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Reviews::Reports).json_binary().not_null())
                    .col(
                        ColumnDef::new(Reviews::FlaggedForModeration)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Reviews::Edited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(Reviews::CreatedAt))
                    .col(timestamp_col(Reviews::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reviews-venue_id-created_at")
                    .table(Reviews::Table)
                    .col(Reviews::VenueId)
                    .col(Reviews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(id_col(Notifications::Id))
                    .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(Notifications::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Refunds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Holidays::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Discounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Facilities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Facilities {
    Table,
    Id,
    VenueId,
    Name,
    SportsTypeIds,
    BookingPolicy,
    Capacity,
    CapacityType,
    MinBookingDurationMinutes,
    SlotIncrementMinutes,
    MaxBookingDurationMinutes,
    OperatingHours,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    VenueId,
    FacilityId,
    Currency,
    CustomerName,
    CustomerMobile,
    StartTime,
    EndTime,
    Capacity,
    Segments,
    Subtotal,
    TotalDiscount,
    BookingFee,
    BookingFeePercentage,
    VenueCommission,
    VenueCommissionPercentage,
    TotalAmount,
    AppliedDiscounts,
    PaymentIntentId,
    PaymentId,
    Status,
    ApprovalRequired,
    ApprovalStatus,
    ApprovalNotes,
    ApprovedBy,
    ApprovedAt,
    AdditionalInfo,
    CreatedBy,
    Origin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    FacilityId,
    VenueId,
    StartTime,
    EndTime,
    Capacity,
    Currency,
    Segments,
    Subtotal,
    TotalDiscount,
    FinalAmount,
    BookingFee,
    BookingFeePercentage,
    VenueCommission,
    VenueCommissionPercentage,
    TotalAmount,
    DiscountCode,
    DiscountValue,
    UserId,
    ExpiresAt,
    BookingId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Discounts {
    Table,
    Id,
    Code,
    Name,
    Description,
    DiscountType,
    Value,
    Scope,
    VenueId,
    FacilityId,
    MaxUses,
    UsedCount,
    MaxUsesPerUser,
    MinBookingAmount,
    StartDate,
    EndDate,
    IsActive,
    DaysOfWeek,
    TimeSlots,
    UsageHistory,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Holidays {
    Table,
    Id,
    VenueId,
    Name,
    HolidayType,
    Date,
    RecurringMonth,
    RecurringDay,
    FacilityIds,
    OperatingHours,
    IsFullDayClosure,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    BookingId,
    CustomerId,
    Amount,
    Currency,
    Status,
    Transaction,
    PaymentMethod,
    DiscountId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Refunds {
    Table,
    Id,
    BookingId,
    PaymentId,
    Amount,
    Status,
    Reason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    UserId,
    VenueId,
    FacilityId,
    BookingId,
    Rating,
    Title,
    Comment,
    Attributes,
    VerificationDetails,
    HelpfulCount,
    Reports,
    FlaggedForModeration,
    Edited,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Title,
    Message,
    NotificationType,
    Read,
    CreatedAt,
}
