//! Engine facade
//!
//! Wires the services over one set of repositories and collaborators and
//! exposes the public operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::events::{create_event_bus, EventSubscriber, SharedEventBus};
use crate::application::services::{
    ActivityLogger, AvailabilityCache, CheckoutReceipt, FeeCalculator, FeeQuote,
    PaymentSettlement, ReservationScheduler, SessionManager, SpotFilter, SpotRegistry,
};
use crate::config::AppConfig;
use crate::domain::{
    AuditSink, DomainResult, ParkingSession, Payment, PaymentGateway, PaymentMethod,
    RepositoryProvider, Reservation, Spot, SpotClass, UserDirectory,
};
use crate::shared::time::SharedClock;

/// Collaborators the engine runs against
pub struct EngineDeps {
    pub repos: Arc<dyn RepositoryProvider>,
    pub users: Arc<dyn UserDirectory>,
    pub audit: Arc<dyn AuditSink>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub clock: SharedClock,
}

pub struct ParkingEngine {
    registry: Arc<SpotRegistry>,
    fees: Arc<FeeCalculator>,
    sessions: SessionManager,
    reservations: ReservationScheduler,
    settlement: Arc<PaymentSettlement>,
    availability: Arc<AvailabilityCache>,
    events: SharedEventBus,
}

impl ParkingEngine {
    pub fn new(deps: EngineDeps, config: &AppConfig) -> Self {
        let EngineDeps {
            repos,
            users,
            audit,
            gateway,
            clock,
        } = deps;

        let events = create_event_bus();
        let activity = ActivityLogger::new(audit);
        let availability = Arc::new(AvailabilityCache::new(repos.clone()));
        let fees = Arc::new(FeeCalculator::new(config.pricing.clone()));
        let registry = Arc::new(SpotRegistry::new(
            repos.clone(),
            availability.clone(),
            events.clone(),
            clock.clone(),
            config.engine.cas_retry(),
        ));
        let settlement = Arc::new(PaymentSettlement::new(
            repos.clone(),
            gateway,
            activity.clone(),
            events.clone(),
            clock.clone(),
            config.pricing.currency.clone(),
        ));
        let sessions = SessionManager::new(
            repos.clone(),
            users.clone(),
            registry.clone(),
            fees.clone(),
            settlement.clone(),
            activity.clone(),
            events.clone(),
            clock.clone(),
        );
        let reservations = ReservationScheduler::new(
            repos,
            users,
            activity,
            events.clone(),
            clock,
            config.engine.default_reservation_minutes,
        );

        Self {
            registry,
            fees,
            sessions,
            reservations,
            settlement,
            availability,
            events,
        }
    }

    pub fn registry(&self) -> &SpotRegistry {
        &self.registry
    }

    pub fn fees(&self) -> &FeeCalculator {
        &self.fees
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn reservations(&self) -> &ReservationScheduler {
        &self.reservations
    }

    pub fn settlement(&self) -> &PaymentSettlement {
        &self.settlement
    }

    pub fn subscribe(&self) -> EventSubscriber {
        self.events.subscribe()
    }

    pub async fn register_spot(&self, label: &str, class: SpotClass) -> DomainResult<Spot> {
        self.registry.register(label, class).await
    }

    pub async fn available_spots(&self, filter: SpotFilter) -> DomainResult<Arc<Vec<Spot>>> {
        self.availability.available_spots(filter).await
    }

    pub async fn check_in(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        vehicle_tag: Option<String>,
    ) -> DomainResult<ParkingSession> {
        self.sessions.check_in(user_id, spot_id, vehicle_tag).await
    }

    pub async fn check_out(
        &self,
        session_id: Uuid,
        method: PaymentMethod,
    ) -> DomainResult<CheckoutReceipt> {
        self.sessions.check_out(session_id, method).await
    }

    pub async fn quote(&self, session_id: Uuid) -> DomainResult<FeeQuote> {
        self.sessions.quote(session_id).await
    }

    pub async fn create_reservation(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: Option<i64>,
    ) -> DomainResult<Reservation> {
        self.reservations
            .create_reservation(user_id, spot_id, start_time, duration_minutes)
            .await
    }

    pub async fn cancel_reservation(&self, reservation_id: Uuid) -> DomainResult<Reservation> {
        self.reservations.cancel_reservation(reservation_id).await
    }

    pub async fn process_payment(
        &self,
        session_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
    ) -> DomainResult<Payment> {
        self.settlement
            .process_payment(session_id, amount, method)
            .await
    }
}
