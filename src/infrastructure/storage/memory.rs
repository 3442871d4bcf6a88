//! In-memory storage implementation
//!
//! A single [`InMemoryStorage`] implements every repository trait. Each
//! cross-request invariant is enforced with a DashMap critical section:
//!
//! - spot compare-and-swap: one `get_mut` guard on the spot
//! - unique spot labels: `spot_labels` claimed before the spot row
//! - one ACTIVE session per user / per spot: `active_by_user` and
//!   `active_by_spot` claimed through the entry API
//! - no overlapping holding reservations: check and insert under the
//!   spot's entry in `reservations_by_spot`
//! - one open settlement per session: `settlement_slots`
//!
//! Guards on two maps are never held at the same time, except
//! index-then-record in `insert_exclusive` / `insert_pending`, which no
//! other path takes in the opposite order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    DomainError, DomainResult, ParkingSession, Payment, PaymentRepository, PaymentStatus,
    RepositoryProvider, Reservation, ReservationRepository, ReservationStatus,
    SessionRepository, Spot, SpotRepository, SpotStatus, UserDirectory, UserRecord,
};

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryStorage {
    spots: DashMap<Uuid, Spot>,
    spot_labels: DashMap<String, Uuid>,
    sessions: DashMap<Uuid, ParkingSession>,
    active_by_user: DashMap<Uuid, Uuid>,
    active_by_spot: DashMap<Uuid, Uuid>,
    reservations: DashMap<Uuid, Reservation>,
    reservations_by_spot: DashMap<Uuid, Vec<Uuid>>,
    payments: DashMap<Uuid, Payment>,
    settlement_slots: DashMap<Uuid, Uuid>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn release_active(&self, session: &ParkingSession) {
        self.active_by_user
            .remove_if(&session.user_id, |_, id| *id == session.id);
        self.active_by_spot
            .remove_if(&session.spot_id, |_, id| *id == session.id);
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn spots(&self) -> &dyn SpotRepository {
        self
    }

    fn sessions(&self) -> &dyn SessionRepository {
        self
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        self
    }

    fn payments(&self) -> &dyn PaymentRepository {
        self
    }
}

#[async_trait]
impl SpotRepository for InMemoryStorage {
    async fn save(&self, spot: Spot) -> DomainResult<()> {
        match self.spot_labels.entry(spot.label.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!(
                    "Spot label {} already in use",
                    spot.label
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(spot.id);
            }
        }

        match self.spots.entry(spot.id) {
            Entry::Occupied(_) => {
                self.spot_labels.remove_if(&spot.label, |_, id| *id == spot.id);
                Err(DomainError::Conflict(format!(
                    "Spot {} already exists",
                    spot.id
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(spot);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Spot>> {
        Ok(self.spots.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Spot>> {
        let mut spots: Vec<Spot> = self.spots.iter().map(|s| s.value().clone()).collect();
        spots.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(spots)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected_version: i64,
        expected_status: SpotStatus,
        new_status: SpotStatus,
    ) -> DomainResult<Option<Spot>> {
        let Some(mut spot) = self.spots.get_mut(&id) else {
            return Ok(None);
        };
        if spot.transition(expected_version, expected_status, new_status, Utc::now()) {
            Ok(Some(spot.clone()))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryStorage {
    async fn insert_active(&self, session: ParkingSession) -> DomainResult<()> {
        match self.active_by_user.entry(session.user_id) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(
                    "User already has an active parking session".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(session.id);
            }
        }

        let spot_claimed = match self.active_by_spot.entry(session.spot_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(session.id);
                true
            }
        };
        if !spot_claimed {
            self.active_by_user
                .remove_if(&session.user_id, |_, id| *id == session.id);
            return Err(DomainError::Conflict(
                "Spot already has an active parking session".to_string(),
            ));
        }

        self.sessions.insert(session.id, session);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingSession>> {
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn find_active_for_user(&self, user_id: Uuid) -> DomainResult<Option<ParkingSession>> {
        let Some(session_id) = self.active_by_user.get(&user_id).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .sessions
            .get(&session_id)
            .filter(|s| s.is_active())
            .map(|s| s.clone()))
    }

    async fn find_active_for_spot(&self, spot_id: Uuid) -> DomainResult<Option<ParkingSession>> {
        let Some(session_id) = self.active_by_spot.get(&spot_id).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .sessions
            .get(&session_id)
            .filter(|s| s.is_active())
            .map(|s| s.clone()))
    }

    async fn complete(
        &self,
        id: Uuid,
        check_out_time: DateTime<Utc>,
        amount_due: Decimal,
    ) -> DomainResult<Option<ParkingSession>> {
        let completed = {
            let Some(mut session) = self.sessions.get_mut(&id) else {
                return Ok(None);
            };
            if !session.complete(check_out_time, amount_due) {
                return Ok(None);
            }
            session.clone()
        };
        self.release_active(&completed);
        Ok(Some(completed))
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<ParkingSession>> {
        let mut sessions: Vec<ParkingSession> = self
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        Ok(sessions)
    }

    async fn find_all(&self) -> DomainResult<Vec<ParkingSession>> {
        Ok(self.sessions.iter().map(|s| s.value().clone()).collect())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStorage {
    async fn insert_exclusive(&self, reservation: Reservation) -> DomainResult<bool> {
        let mut spot_index = self.reservations_by_spot.entry(reservation.spot_id).or_default();

        let overlapping = spot_index.iter().any(|id| {
            self.reservations
                .get(id)
                .is_some_and(|r| r.holds(reservation.start_time, reservation.end_time))
        });
        if overlapping {
            return Ok(false);
        }

        spot_index.push(reservation.id);
        self.reservations.insert(reservation.id, reservation);
        Ok(true)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn update(&self, reservation: Reservation) -> DomainResult<()> {
        match self.reservations.get_mut(&reservation.id) {
            Some(mut existing) => {
                *existing = reservation;
                Ok(())
            }
            None => Err(DomainError::not_found("Reservation", reservation.id)),
        }
    }

    async fn exists_overlapping(
        &self,
        spot_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[ReservationStatus],
    ) -> DomainResult<bool> {
        Ok(self.reservations.iter().any(|r| {
            r.spot_id == spot_id && statuses.contains(&r.status) && r.overlaps(start, end)
        }))
    }

    async fn find_in_effect(
        &self,
        spot_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .find(|r| r.spot_id == spot_id && r.status.is_holding() && r.covers(at))
            .map(|r| r.value().clone()))
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        reservations.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(reservations)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStorage {
    async fn insert_pending(&self, payment: Payment) -> DomainResult<()> {
        // The payment row is written while the slot entry is still locked,
        // so a claimed slot always points at an existing payment.
        match self.settlement_slots.entry(payment.session_id) {
            Entry::Occupied(mut slot) => {
                let held = self
                    .payments
                    .get(slot.get())
                    .map_or(true, |p| p.status.holds_settlement());
                if held {
                    return Err(DomainError::Conflict(
                        "Session already has a payment in progress or settled".to_string(),
                    ));
                }
                slot.insert(payment.id);
                self.payments.insert(payment.id, payment);
            }
            Entry::Vacant(slot) => {
                slot.insert(payment.id);
                self.payments.insert(payment.id, payment);
            }
        }
        Ok(())
    }

    async fn mark_succeeded(&self, id: Uuid, transaction_reference: &str) -> DomainResult<Payment> {
        let mut payment = self
            .payments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Payment", id))?;
        if payment.status != PaymentStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "Payment {} is {}, not PENDING",
                id, payment.status
            )));
        }
        payment.status = PaymentStatus::Success;
        payment.transaction_reference = Some(transaction_reference.to_string());
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> DomainResult<Payment> {
        let failed = {
            let mut payment = self
                .payments
                .get_mut(&id)
                .ok_or_else(|| DomainError::not_found("Payment", id))?;
            if payment.status != PaymentStatus::Pending {
                return Err(DomainError::Conflict(format!(
                    "Payment {} is {}, not PENDING",
                    id, payment.status
                )));
            }
            payment.status = PaymentStatus::Failed;
            payment.failure_reason = Some(reason.to_string());
            payment.updated_at = Utc::now();
            payment.clone()
        };
        self.settlement_slots
            .remove_if(&failed.session_id, |_, held| *held == failed.id);
        Ok(failed)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        Ok(self.payments.get(&id).map(|p| p.clone()))
    }

    async fn find_for_session(&self, session_id: Uuid) -> DomainResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.session_id == session_id)
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(payments)
    }
}

/// User directory backed by a DashMap; stands in for the identity service
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<Uuid, UserRecord>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.upsert(user);
        }
        directory
    }

    pub fn upsert(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: Uuid) -> DomainResult<Option<UserRecord>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}
