//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Reservation, ReservationStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a reservation unless a holding (PENDING/ACTIVE) reservation
    /// on the same spot overlaps its window. The overlap check and the
    /// insert are atomic with respect to other inserts on that spot.
    ///
    /// Returns `false` (and stores nothing) on overlap.
    async fn insert_exclusive(&self, reservation: Reservation) -> DomainResult<bool>;

    /// Find reservation by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>>;

    /// Update an existing reservation
    async fn update(&self, reservation: Reservation) -> DomainResult<()>;

    /// Whether any reservation on `spot_id` with a status in `statuses`
    /// overlaps the half-open window `[start, end)`
    async fn exists_overlapping(
        &self,
        spot_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[ReservationStatus],
    ) -> DomainResult<bool>;

    /// The holding reservation on `spot_id` whose window contains `at`
    async fn find_in_effect(
        &self,
        spot_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<Reservation>>;

    /// All reservations of a user, latest start first
    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>>;
}
