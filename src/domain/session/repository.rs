//! Parking session repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::model::ParkingSession;
use crate::domain::DomainResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new ACTIVE session.
    ///
    /// Fails with `Conflict` if the user or the spot already has an ACTIVE
    /// session; the check and the insert are a single atomic step.
    async fn insert_active(&self, session: ParkingSession) -> DomainResult<()>;

    /// Find session by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingSession>>;

    /// The user's ACTIVE session, if any
    async fn find_active_for_user(&self, user_id: Uuid) -> DomainResult<Option<ParkingSession>>;

    /// The spot's ACTIVE session, if any
    async fn find_active_for_spot(&self, spot_id: Uuid) -> DomainResult<Option<ParkingSession>>;

    /// Complete an ACTIVE session in one conditional write.
    ///
    /// Returns the completed session, or `None` if it was no longer ACTIVE
    /// (somebody else checked it out first).
    async fn complete(
        &self,
        id: Uuid,
        check_out_time: DateTime<Utc>,
        amount_due: Decimal,
    ) -> DomainResult<Option<ParkingSession>>;

    /// All sessions of a user, newest check-in first
    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<ParkingSession>>;

    /// All sessions (any status)
    async fn find_all(&self) -> DomainResult<Vec<ParkingSession>>;
}
