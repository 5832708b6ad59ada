//! Adds per-leg provisioning state to venues so partially provisioned records can be retried.
//!
//! SQLite only accepts one option per `ALTER TABLE`, so each column is added separately.

use sea_orm_migration::prelude::*;

use crate::m2025_03_01_000003_create_venues::Venues;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Venues::Table)
                    .add_column(
                        ColumnDef::new(Provisioning::MediaProvisioning)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Venues::Table)
                    .add_column(
                        ColumnDef::new(Provisioning::PaymentProvisioning)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Venues::Table)
                    .add_column(ColumnDef::new(Provisioning::PendingMedia).json_binary())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [
            Provisioning::PendingMedia,
            Provisioning::PaymentProvisioning,
            Provisioning::MediaProvisioning,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Venues::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Provisioning {
    MediaProvisioning,
    PaymentProvisioning,
    PendingMedia,
}
