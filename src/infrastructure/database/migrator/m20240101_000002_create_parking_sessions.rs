//! Create parking_sessions table
//!
//! `active_user_key` / `active_spot_key` carry the user / spot id while a
//! session is ACTIVE and are cleared at check-out. Unique indexes over
//! them enforce one ACTIVE session per user and per spot.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_spots::Spots;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingSessions::SpotId).string().not_null())
                    .col(ColumnDef::new(ParkingSessions::UserId).string().not_null())
                    .col(ColumnDef::new(ParkingSessions::VehicleTag).string())
                    .col(ColumnDef::new(ParkingSessions::ReservationId).string())
                    .col(
                        ColumnDef::new(ParkingSessions::CheckInTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSessions::CheckOutTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ParkingSessions::DurationMinutes).big_integer())
                    .col(ColumnDef::new(ParkingSessions::AmountDueCents).big_integer())
                    .col(
                        ColumnDef::new(ParkingSessions::Status)
                            .string()
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(ParkingSessions::ActiveUserKey).string())
                    .col(ColumnDef::new(ParkingSessions::ActiveSpotKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_sessions_spot")
                            .from(ParkingSessions::Table, ParkingSessions::SpotId)
                            .to(Spots::Table, Spots::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_parking_sessions_active_user")
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::ActiveUserKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_parking_sessions_active_spot")
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::ActiveSpotKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_sessions_user")
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingSessions {
    Table,
    Id,
    SpotId,
    UserId,
    VehicleTag,
    ReservationId,
    CheckInTime,
    CheckOutTime,
    DurationMinutes,
    AmountDueCents,
    Status,
    ActiveUserKey,
    ActiveSpotKey,
}
