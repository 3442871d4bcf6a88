//! Create payments table
//!
//! `settlement_key` holds the session id while a payment is PENDING or
//! SUCCESS; the unique index over it allows one open settlement per
//! session.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_parking_sessions::ParkingSessions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Payments::SessionId).string().not_null())
                    .col(ColumnDef::new(Payments::AmountCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(
                        ColumnDef::new(Payments::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Payments::TransactionReference).string())
                    .col(ColumnDef::new(Payments::FailureReason).string())
                    .col(ColumnDef::new(Payments::SettlementKey).string())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_session")
                            .from(Payments::Table, Payments::SessionId)
                            .to(ParkingSessions::Table, ParkingSessions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_payments_settlement")
                    .table(Payments::Table)
                    .col(Payments::SettlementKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_session")
                    .table(Payments::Table)
                    .col(Payments::SessionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Payments {
    Table,
    Id,
    SessionId,
    AmountCents,
    Currency,
    Method,
    Status,
    TransactionReference,
    FailureReason,
    SettlementKey,
    CreatedAt,
    UpdatedAt,
}
