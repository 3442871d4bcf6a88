//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_spots;
mod m20240101_000002_create_parking_sessions;
mod m20240101_000003_create_reservations;
mod m20240101_000004_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_spots::Migration),
            Box::new(m20240101_000002_create_parking_sessions::Migration),
            Box::new(m20240101_000003_create_reservations::Migration),
            Box::new(m20240101_000004_create_payments::Migration),
        ]
    }
}
