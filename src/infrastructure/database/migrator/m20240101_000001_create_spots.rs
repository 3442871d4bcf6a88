//! Create spots table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Spots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Spots::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Spots::Label).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Spots::Class)
                            .string()
                            .not_null()
                            .default("STANDARD"),
                    )
                    .col(
                        ColumnDef::new(Spots::Status)
                            .string()
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(
                        ColumnDef::new(Spots::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Spots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Spots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_spots_status_class")
                    .table(Spots::Table)
                    .col(Spots::Status)
                    .col(Spots::Class)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Spots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Spots {
    Table,
    Id,
    Label,
    Class,
    Status,
    Version,
    CreatedAt,
    UpdatedAt,
}
