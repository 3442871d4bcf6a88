//! Spot registry
//!
//! The only place a spot's status changes. Every transition is a
//! compare-and-swap on (version, status); a CAS that loses a version race
//! is retried a bounded number of times, a status mismatch is not.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::application::events::{Event, SharedEventBus, SpotStatusChangedEvent};
use crate::domain::{DomainError, DomainResult, RepositoryProvider, Spot, SpotClass, SpotStatus};
use crate::shared::retry::{retry_with_backoff, RetryConfig};
use crate::shared::time::SharedClock;

use super::availability::AvailabilityCache;

pub struct SpotRegistry {
    repos: Arc<dyn RepositoryProvider>,
    cache: Arc<AvailabilityCache>,
    events: SharedEventBus,
    clock: SharedClock,
    retry: RetryConfig,
}

impl SpotRegistry {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        cache: Arc<AvailabilityCache>,
        events: SharedEventBus,
        clock: SharedClock,
        retry: RetryConfig,
    ) -> Self {
        Self {
            repos,
            cache,
            events,
            clock,
            retry,
        }
    }

    /// Add a spot (admin workflow / seeding)
    pub async fn register(&self, label: impl Into<String>, class: SpotClass) -> DomainResult<Spot> {
        let mut spot = Spot::new(label, class);
        let now = self.clock.now();
        spot.created_at = now;
        spot.updated_at = now;
        self.repos.spots().save(spot.clone()).await?;
        self.cache.invalidate();
        info!(spot_id = %spot.id, label = spot.label.as_str(), class = %spot.class, "Spot registered");
        Ok(spot)
    }

    pub async fn get(&self, spot_id: Uuid) -> DomainResult<Spot> {
        self.repos
            .spots()
            .find_by_id(spot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Spot", spot_id))
    }

    pub async fn list(&self) -> DomainResult<Vec<Spot>> {
        self.repos.spots().find_all().await
    }

    /// Move `spot_id` from `expected` to `new_status`.
    ///
    /// Fails with `Conflict` if the spot is not at `expected`, and with
    /// `StaleVersion` once every attempt lost a version race.
    pub async fn try_transition(
        &self,
        spot_id: Uuid,
        expected: SpotStatus,
        new_status: SpotStatus,
    ) -> DomainResult<Spot> {
        let this = self;
        let (previous, updated) = retry_with_backoff(
            &self.retry,
            move || async move { this.attempt_transition(spot_id, expected, new_status).await },
            DomainError::is_transient,
            "spot_transition",
        )
        .await?;

        self.cache.invalidate();
        self.events
            .publish(Event::SpotStatusChanged(SpotStatusChangedEvent {
                spot_id,
                old_status: previous,
                new_status: updated.status,
                version: updated.version,
                timestamp: updated.updated_at,
            }));
        info!(
            %spot_id,
            from = %previous,
            to = %updated.status,
            version = updated.version,
            "Spot transitioned"
        );
        Ok(updated)
    }

    async fn attempt_transition(
        &self,
        spot_id: Uuid,
        expected: SpotStatus,
        new_status: SpotStatus,
    ) -> DomainResult<(SpotStatus, Spot)> {
        let current = self.get(spot_id).await?;
        if current.status != expected {
            return Err(DomainError::Conflict(format!(
                "Spot {} is {}, expected {}",
                current.label, current.status, expected
            )));
        }

        match self
            .repos
            .spots()
            .compare_and_set_status(spot_id, current.version, expected, new_status)
            .await?
        {
            Some(updated) => Ok((current.status, updated)),
            None => {
                metrics::counter!("parking_spot_cas_conflicts_total").increment(1);
                debug!(%spot_id, version = current.version, "Spot CAS lost a race");
                Err(DomainError::StaleVersion {
                    entity: "Spot",
                    id: spot_id.to_string(),
                    expected: current.version,
                })
            }
        }
    }
}
