//! SeaORM repository implementations

mod payment_repository;
mod repository_provider;
mod reservation_repository;
mod session_repository;
mod spot_repository;

pub use payment_repository::SeaOrmPaymentRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use reservation_repository::SeaOrmReservationRepository;
pub use session_repository::SeaOrmSessionRepository;
pub use spot_repository::SeaOrmSpotRepository;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::shared::errors::InfraError;

// ── Conversion helpers shared by the repositories ──────────────

pub(crate) fn db_err(e: DbErr) -> DomainError {
    InfraError::Database(e).into()
}

pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn parse_id(entity: &'static str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw)
        .map_err(|e| DomainError::Storage(format!("{entity} row has malformed id {raw:?}: {e}")))
}

pub(crate) fn parse_optional_id(
    entity: &'static str,
    raw: Option<&str>,
) -> Result<Option<Uuid>, DomainError> {
    raw.map(|r| parse_id(entity, r)).transpose()
}

pub(crate) fn corrupt(entity: &'static str, column: &str, value: &str) -> DomainError {
    DomainError::Storage(format!("{entity}.{column} holds unknown value {value:?}"))
}

pub(crate) fn to_cents(amount: Decimal) -> Result<i64, DomainError> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| DomainError::Storage(format!("amount {amount} out of range")))
}

pub(crate) fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
