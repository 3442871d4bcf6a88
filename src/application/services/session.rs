//! Session management: check-in and check-out
//!
//! Lifecycle: NONE → ACTIVE → COMPLETED. The spot is OCCUPIED exactly
//! while one ACTIVE session references it. Check-out releases the spot
//! before any payment is attempted; a failed payment never reopens the
//! session or re-occupies the spot.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::events::{Event, SessionCompletedEvent, SessionStartedEvent, SharedEventBus};
use crate::domain::{
    ActionCode, DomainError, DomainResult, ParkingSession, Payment, PaymentMethod,
    RepositoryProvider, SpotStatus, UserDirectory,
};
use crate::shared::time::SharedClock;

use super::activity::ActivityLogger;
use super::fee::{FeeCalculator, FeeQuote};
use super::payment::PaymentSettlement;
use super::require_active_user;
use super::spot_registry::SpotRegistry;

/// Outcome of a successful check-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub session: ParkingSession,
    /// `None` when nothing was due
    pub payment: Option<Payment>,
}

pub struct SessionManager {
    repos: Arc<dyn RepositoryProvider>,
    users: Arc<dyn UserDirectory>,
    registry: Arc<SpotRegistry>,
    fees: Arc<FeeCalculator>,
    settlement: Arc<PaymentSettlement>,
    activity: ActivityLogger,
    events: SharedEventBus,
    clock: SharedClock,
}

impl SessionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        users: Arc<dyn UserDirectory>,
        registry: Arc<SpotRegistry>,
        fees: Arc<FeeCalculator>,
        settlement: Arc<PaymentSettlement>,
        activity: ActivityLogger,
        events: SharedEventBus,
        clock: SharedClock,
    ) -> Self {
        Self {
            repos,
            users,
            registry,
            fees,
            settlement,
            activity,
            events,
            clock,
        }
    }

    pub async fn check_in(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        vehicle_tag: Option<String>,
    ) -> DomainResult<ParkingSession> {
        require_active_user(self.users.as_ref(), user_id).await?;

        if self
            .repos
            .sessions()
            .find_active_for_user(user_id)
            .await?
            .is_some()
        {
            warn!(%user_id, %spot_id, "Check-in rejected: user already parked");
            return Err(DomainError::Conflict(
                "User already has an active parking session".to_string(),
            ));
        }

        let spot = self.registry.get(spot_id).await?;
        if spot.status != SpotStatus::Available {
            warn!(%user_id, %spot_id, status = %spot.status, "Check-in rejected: spot not available");
            return Err(DomainError::Conflict(format!(
                "Spot {} is not available",
                spot.label
            )));
        }

        let now = self.clock.now();
        let honoured = match self.repos.reservations().find_in_effect(spot_id, now).await? {
            Some(r) if r.user_id != user_id => {
                warn!(%user_id, %spot_id, reservation_id = %r.id, "Check-in rejected: spot reserved");
                return Err(DomainError::Conflict(format!(
                    "Spot {} is reserved by another user until {}",
                    spot.label, r.end_time
                )));
            }
            other => other,
        };

        self.registry
            .try_transition(spot_id, SpotStatus::Available, SpotStatus::Occupied)
            .await?;

        let mut session = ParkingSession::start(spot_id, user_id, vehicle_tag, now);
        session.reservation_id = honoured.as_ref().map(|r| r.id);

        if let Err(e) = self.repos.sessions().insert_active(session.clone()).await {
            warn!(%user_id, %spot_id, error = %e, "Session insert rejected; releasing spot");
            if let Err(undo) = self
                .registry
                .try_transition(spot_id, SpotStatus::Occupied, SpotStatus::Available)
                .await
            {
                error!(%spot_id, error = %undo, "Failed to release spot after rejected check-in");
            }
            return Err(e);
        }

        if let Some(mut reservation) = honoured {
            reservation.activate(now);
            if let Err(e) = self.repos.reservations().update(reservation).await {
                warn!(session_id = %session.id, error = %e, "Failed to activate reservation");
            }
        }

        self.activity
            .record(
                user_id,
                ActionCode::CheckIn,
                format!("Checked in to spot {}", spot.label),
            )
            .await;
        self.events.publish(Event::SessionStarted(SessionStartedEvent {
            session_id: session.id,
            spot_id,
            user_id,
            timestamp: now,
        }));
        metrics::counter!("parking_check_ins_total").increment(1);
        info!(session_id = %session.id, %spot_id, %user_id, "Checked in");

        Ok(session)
    }

    /// Complete the session, release the spot, then settle.
    ///
    /// A settlement failure comes back as `SettlementFailed`; by then the
    /// session is COMPLETED and the spot AVAILABLE, and both stay that way.
    pub async fn check_out(
        &self,
        session_id: Uuid,
        method: PaymentMethod,
    ) -> DomainResult<CheckoutReceipt> {
        let session = self.get(session_id).await?;
        if !session.is_active() {
            return Err(DomainError::Conflict(
                "Session already checked out".to_string(),
            ));
        }

        let spot = self.registry.get(session.spot_id).await?;
        let now = self.clock.now();
        let minutes = session.elapsed_minutes(now);
        let amount_due = self.fees.calculate_fee(minutes, spot.class);

        let completed = self
            .repos
            .sessions()
            .complete(session_id, now, amount_due)
            .await?
            .ok_or_else(|| DomainError::Conflict("Session already checked out".to_string()))?;

        if let Err(e) = self
            .registry
            .try_transition(spot.id, SpotStatus::Occupied, SpotStatus::Available)
            .await
        {
            error!(%session_id, spot_id = %spot.id, error = %e, "Session completed but spot release failed");
            return Err(e);
        }

        if let Some(reservation_id) = completed.reservation_id {
            self.complete_reservation(reservation_id).await;
        }

        self.activity
            .record(
                completed.user_id,
                ActionCode::CheckOut,
                format!(
                    "Checked out of spot {} after {} min, due {} {}",
                    spot.label,
                    minutes,
                    amount_due,
                    self.fees.currency()
                ),
            )
            .await;
        self.events.publish(Event::SessionCompleted(SessionCompletedEvent {
            session_id,
            spot_id: spot.id,
            user_id: completed.user_id,
            duration_minutes: minutes,
            amount_due,
            timestamp: now,
        }));
        metrics::counter!("parking_check_outs_total").increment(1);
        info!(%session_id, spot_id = %spot.id, minutes, amount_due = %amount_due, "Checked out");

        if amount_due <= Decimal::ZERO {
            return Ok(CheckoutReceipt {
                session: completed,
                payment: None,
            });
        }

        match self
            .settlement
            .process_payment(session_id, amount_due, method)
            .await
        {
            Ok(payment) => Ok(CheckoutReceipt {
                session: completed,
                payment: Some(payment),
            }),
            Err(e) => {
                error!(
                    %session_id,
                    spot_id = %spot.id,
                    amount_due = %amount_due,
                    error = %e,
                    "Spot released and session completed, but settlement failed"
                );
                Err(DomainError::SettlementFailed {
                    session_id,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Price the elapsed time of an ACTIVE session without changing it
    pub async fn quote(&self, session_id: Uuid) -> DomainResult<FeeQuote> {
        let session = self.get(session_id).await?;
        if !session.is_active() {
            return Err(DomainError::Conflict(
                "Session already checked out".to_string(),
            ));
        }
        let spot = self.registry.get(session.spot_id).await?;
        Ok(self
            .fees
            .quote(session.elapsed_minutes(self.clock.now()), spot.class))
    }

    pub async fn get(&self, session_id: Uuid) -> DomainResult<ParkingSession> {
        self.repos
            .sessions()
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Session", session_id))
    }

    pub async fn active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<ParkingSession>> {
        Ok(self
            .repos
            .sessions()
            .find_active_for_user(user_id)
            .await?
            .into_iter()
            .collect())
    }

    /// Newest check-in first
    pub async fn user_sessions(&self, user_id: Uuid) -> DomainResult<Vec<ParkingSession>> {
        self.repos.sessions().find_for_user(user_id).await
    }

    async fn complete_reservation(&self, reservation_id: Uuid) {
        let result = async {
            if let Some(mut reservation) =
                self.repos.reservations().find_by_id(reservation_id).await?
            {
                if reservation.status.is_holding() {
                    reservation.complete(self.clock.now());
                    self.repos.reservations().update(reservation).await?;
                }
            }
            Ok::<_, DomainError>(())
        }
        .await;
        if let Err(e) = result {
            warn!(%reservation_id, error = %e, "Failed to complete reservation at check-out");
        }
    }
}
