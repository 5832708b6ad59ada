//! Migration to create the amenities and sports_types catalog tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Amenities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Amenities::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Amenities::Name).string().not_null())
                    .col(
                        ColumnDef::new(Amenities::Value)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Amenities::Icon).json_binary().not_null())
                    .col(
                        ColumnDef::new(Amenities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Amenities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SportsTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SportsTypes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SportsTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SportsTypes::Icon).string())
                    .col(
                        ColumnDef::new(SportsTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SportsTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Amenities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Amenities {
    Table,
    Id,
    Name,
    Value,
    Icon,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SportsTypes {
    Table,
    Id,
    Name,
    Icon,
    CreatedAt,
}
