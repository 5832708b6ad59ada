//! Migration to create the venues table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Venues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Venues::Id).uuid().not_null().primary_key())
                    // No foreign key: owner existence is only checked when the venue is created.
                    .col(ColumnDef::new(Venues::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Venues::Name).string().not_null())
                    .col(
                        ColumnDef::new(Venues::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Venues::Address).string().not_null())
                    .col(ColumnDef::new(Venues::Country).string_len(2).not_null())
                    .col(ColumnDef::new(Venues::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Venues::Longitude).double().not_null())
                    .col(ColumnDef::new(Venues::Latitude).double().not_null())
                    .col(ColumnDef::new(Venues::Amenities).json_binary().not_null())
                    .col(ColumnDef::new(Venues::SportsTypes).json_binary().not_null())
                    .col(ColumnDef::new(Venues::Images).json_binary().not_null())
                    .col(
                        ColumnDef::new(Venues::CommissionPercentage)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Venues::StripeAccountId).string())
                    .col(
                        ColumnDef::new(Venues::StripeOnboardingComplete)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Venues::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Venues::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Venues::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Venues::RatingAverage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Venues::RatingCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Venues::RatingDistribution)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Venues::Managers).json_binary().not_null())
                    .col(
                        ColumnDef::new(Venues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Venues::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-venues-owner_id")
                    .table(Venues::Table)
                    .col(Venues::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-venues-status-deleted_at")
                    .table(Venues::Table)
                    .col(Venues::Status)
                    .col(Venues::DeletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-venues-country")
                    .table(Venues::Table)
                    .col(Venues::Country)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-venues-created_at")
                    .table(Venues::Table)
                    .col(Venues::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Venues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Venues {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Address,
    Country,
    Currency,
    Longitude,
    Latitude,
    Amenities,
    SportsTypes,
    Images,
    CommissionPercentage,
    StripeAccountId,
    StripeOnboardingComplete,
    Status,
    IsEnabled,
    DeletedAt,
    RatingAverage,
    RatingCount,
    RatingDistribution,
    Managers,
    CreatedAt,
    UpdatedAt,
}
