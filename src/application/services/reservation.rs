//! Reservation scheduling
//!
//! A reservation is a soft hold: booking never changes the spot's status.
//! The no-overlap rule covers PENDING and ACTIVE reservations on the same
//! spot over half-open windows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::events::{Event, ReservationEvent, SharedEventBus};
use crate::domain::{
    ActionCode, DomainError, DomainResult, RepositoryProvider, Reservation, ReservationStatus,
    UserDirectory,
};
use crate::shared::time::SharedClock;

use super::activity::ActivityLogger;
use super::require_active_user;

pub struct ReservationScheduler {
    repos: Arc<dyn RepositoryProvider>,
    users: Arc<dyn UserDirectory>,
    activity: ActivityLogger,
    events: SharedEventBus,
    clock: SharedClock,
    default_minutes: i64,
}

impl ReservationScheduler {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        users: Arc<dyn UserDirectory>,
        activity: ActivityLogger,
        events: SharedEventBus,
        clock: SharedClock,
        default_minutes: i64,
    ) -> Self {
        Self {
            repos,
            users,
            activity,
            events,
            clock,
            default_minutes,
        }
    }

    /// Book `spot_id` for `[start_time, start_time + duration)`.
    /// Without a duration the configured default length is used.
    pub async fn create_reservation(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: Option<i64>,
    ) -> DomainResult<Reservation> {
        require_active_user(self.users.as_ref(), user_id).await?;

        let spot = self
            .repos
            .spots()
            .find_by_id(spot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Spot", spot_id))?;
        if !spot.is_available() {
            return Err(DomainError::BadRequest(format!(
                "Spot {} is not available for reservation",
                spot.label
            )));
        }

        let duration = duration_minutes.unwrap_or(self.default_minutes);
        if duration <= 0 {
            return Err(DomainError::BadRequest(
                "Reservation duration must be positive".to_string(),
            ));
        }

        let now = self.clock.now();
        if start_time < now {
            return Err(DomainError::BadRequest(
                "Reservation cannot start in the past".to_string(),
            ));
        }

        let reservation = Reservation::new(spot_id, user_id, start_time, duration, now)?;
        let overlapping = self
            .repos
            .reservations()
            .exists_overlapping(
                spot_id,
                reservation.start_time,
                reservation.end_time,
                &ReservationStatus::HOLDING,
            )
            .await?;
        if overlapping || !self.repos.reservations().insert_exclusive(reservation.clone()).await? {
            warn!(%spot_id, %user_id, %start_time, duration, "Overlapping reservation rejected");
            return Err(DomainError::BadRequest(format!(
                "Spot {} is already reserved for the requested time",
                spot.label
            )));
        }

        self.activity
            .record(
                user_id,
                ActionCode::ReservationCreated,
                format!(
                    "Reserved spot {} from {} to {}",
                    spot.label, reservation.start_time, reservation.end_time
                ),
            )
            .await;
        self.events
            .publish(Event::ReservationCreated(Self::event_for(&reservation, now)));
        metrics::counter!("parking_reservations_total").increment(1);
        info!(
            reservation_id = %reservation.id,
            %spot_id,
            %user_id,
            start = %reservation.start_time,
            end = %reservation.end_time,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Cancel a PENDING or ACTIVE reservation. Cancelling twice is a no-op;
    /// a COMPLETED reservation cannot be cancelled.
    pub async fn cancel_reservation(&self, reservation_id: Uuid) -> DomainResult<Reservation> {
        let mut reservation = self
            .repos
            .reservations()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))?;

        match reservation.status {
            ReservationStatus::Completed => {
                return Err(DomainError::Conflict(
                    "Completed reservation cannot be cancelled".to_string(),
                ))
            }
            ReservationStatus::Cancelled => return Ok(reservation),
            ReservationStatus::Pending | ReservationStatus::Active => {}
        }

        let now = self.clock.now();
        reservation.cancel(now);
        self.repos.reservations().update(reservation.clone()).await?;

        self.activity
            .record(
                reservation.user_id,
                ActionCode::ReservationCancelled,
                format!("Cancelled reservation {}", reservation.id),
            )
            .await;
        self.events
            .publish(Event::ReservationCancelled(Self::event_for(&reservation, now)));
        info!(%reservation_id, spot_id = %reservation.spot_id, "Reservation cancelled");
        Ok(reservation)
    }

    pub async fn get(&self, reservation_id: Uuid) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))
    }

    /// Latest start first
    pub async fn user_reservations(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_for_user(user_id).await
    }

    fn event_for(reservation: &Reservation, at: DateTime<Utc>) -> ReservationEvent {
        ReservationEvent {
            reservation_id: reservation.id,
            spot_id: reservation.spot_id,
            user_id: reservation.user_id,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            timestamp: at,
        }
    }
}
