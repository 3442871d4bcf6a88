//! Payment settlement
//!
//! A session is settled at most once. The scan over existing payments
//! rejects the common duplicate early; the storage-level settlement slot
//! claimed by `insert_pending` closes the race between concurrent calls.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::events::{Event, PaymentEvent, SharedEventBus};
use crate::domain::{
    ActionCode, DomainError, DomainResult, Payment, PaymentGateway, PaymentMethod,
    RepositoryProvider, SessionStatus,
};
use crate::shared::time::SharedClock;

use super::activity::ActivityLogger;

pub struct PaymentSettlement {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn PaymentGateway>,
    activity: ActivityLogger,
    events: SharedEventBus,
    clock: SharedClock,
    currency: String,
}

impl PaymentSettlement {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        gateway: Arc<dyn PaymentGateway>,
        activity: ActivityLogger,
        events: SharedEventBus,
        clock: SharedClock,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            repos,
            gateway,
            activity,
            events,
            clock,
            currency: currency.into(),
        }
    }

    pub async fn process_payment(
        &self,
        session_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
    ) -> DomainResult<Payment> {
        let session = self
            .repos
            .sessions()
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Session", session_id))?;

        if session.status != SessionStatus::Completed {
            return Err(DomainError::Conflict(
                "Session must be completed before payment".to_string(),
            ));
        }
        // Money is settled in whole cents
        let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if amount <= Decimal::ZERO {
            return Err(DomainError::Conflict(
                "Payment amount must be positive".to_string(),
            ));
        }

        let existing = self.repos.payments().find_for_session(session_id).await?;
        if existing.iter().any(Payment::is_successful) {
            warn!(%session_id, "Duplicate payment rejected");
            return Err(DomainError::Conflict("Session already paid".to_string()));
        }

        let pending = Payment::pending(session_id, amount, &self.currency, method, self.clock.now());
        let payment_id = pending.id;
        self.repos.payments().insert_pending(pending).await?;

        match self.gateway.charge(amount, method).await {
            Ok(reference) => {
                let payment = self
                    .repos
                    .payments()
                    .mark_succeeded(payment_id, &reference)
                    .await?;

                self.activity
                    .record(
                        session.user_id,
                        ActionCode::PaymentProcessed,
                        format!("Paid {} {} for session {}", payment.amount, payment.currency, session_id),
                    )
                    .await;
                self.events.publish(Event::PaymentSettled(self.event_for(&payment)));
                metrics::counter!("parking_payments_total", "status" => "success").increment(1);
                info!(
                    %session_id,
                    %payment_id,
                    amount = %payment.amount,
                    %method,
                    reference = reference.as_str(),
                    "Payment settled"
                );
                Ok(payment)
            }
            Err(gateway_err) => {
                let reason = gateway_err.to_string();
                let failed = self.repos.payments().mark_failed(payment_id, &reason).await?;

                self.activity
                    .record(
                        session.user_id,
                        ActionCode::PaymentFailed,
                        format!("Payment for session {} failed: {}", session_id, reason),
                    )
                    .await;
                self.events.publish(Event::PaymentFailed(self.event_for(&failed)));
                metrics::counter!("parking_payments_total", "status" => "failed").increment(1);
                warn!(%session_id, %payment_id, reason = reason.as_str(), "Payment declined");
                Err(DomainError::PaymentDeclined(reason))
            }
        }
    }

    pub async fn payments_for_session(&self, session_id: Uuid) -> DomainResult<Vec<Payment>> {
        self.repos.payments().find_for_session(session_id).await
    }

    fn event_for(&self, payment: &Payment) -> PaymentEvent {
        PaymentEvent {
            payment_id: payment.id,
            session_id: payment.session_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            transaction_reference: payment.transaction_reference.clone(),
            reason: payment.failure_reason.clone(),
            timestamp: payment.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::EventBus;
    use crate::domain::{ParkingSession, PaymentStatus};
    use crate::infrastructure::audit::MemoryAuditSink;
    use crate::infrastructure::gateway::SimulatedGateway;
    use crate::infrastructure::storage::InMemoryStorage;
    use crate::shared::time::SystemClock;
    use chrono::Utc;

    struct Fixture {
        storage: Arc<InMemoryStorage>,
        audit: Arc<MemoryAuditSink>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                storage: Arc::new(InMemoryStorage::new()),
                audit: Arc::new(MemoryAuditSink::new()),
            }
        }

        fn settlement(&self, gateway: SimulatedGateway) -> PaymentSettlement {
            PaymentSettlement::new(
                self.storage.clone(),
                Arc::new(gateway),
                ActivityLogger::new(self.audit.clone()),
                Arc::new(EventBus::new()),
                Arc::new(SystemClock),
                "USD",
            )
        }

        async fn session(&self, completed: bool) -> ParkingSession {
            let session = ParkingSession::start(Uuid::new_v4(), Uuid::new_v4(), None, Utc::now());
            self.storage.sessions().insert_active(session.clone()).await.unwrap();
            if completed {
                return self
                    .storage
                    .sessions()
                    .complete(session.id, Utc::now(), Decimal::TEN)
                    .await
                    .unwrap()
                    .unwrap();
            }
            session
        }
    }

    #[tokio::test]
    async fn settles_completed_session() {
        let fx = Fixture::new();
        let session = fx.session(true).await;

        let payment = fx
            .settlement(SimulatedGateway::approving())
            .process_payment(session.id, Decimal::TEN, PaymentMethod::CreditCard)
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.currency, "USD");
        assert!(payment.transaction_reference.unwrap().starts_with("TXN-"));
        assert_eq!(fx.audit.actions().await, vec![ActionCode::PaymentProcessed]);
    }

    #[tokio::test]
    async fn second_payment_conflicts() {
        let fx = Fixture::new();
        let session = fx.session(true).await;
        let settlement = fx.settlement(SimulatedGateway::approving());

        settlement
            .process_payment(session.id, Decimal::TEN, PaymentMethod::Cash)
            .await
            .unwrap();
        let err = settlement
            .process_payment(session.id, Decimal::TEN, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(settlement.payments_for_session(session.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn active_session_cannot_be_paid() {
        let fx = Fixture::new();
        let session = fx.session(false).await;
        let err = fx
            .settlement(SimulatedGateway::approving())
            .process_payment(session.id, Decimal::TEN, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn non_positive_amount_conflicts() {
        let fx = Fixture::new();
        let session = fx.session(true).await;
        let err = fx
            .settlement(SimulatedGateway::approving())
            .process_payment(session.id, Decimal::ZERO, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn sub_cent_amount_conflicts() {
        let fx = Fixture::new();
        let session = fx.session(true).await;
        let settlement = fx.settlement(SimulatedGateway::approving());
        let err = settlement
            .process_payment(session.id, Decimal::new(4, 3), PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(settlement.payments_for_session(session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn amount_is_rounded_half_up_to_cents() {
        let fx = Fixture::new();
        let session = fx.session(true).await;
        let payment = fx
            .settlement(SimulatedGateway::approving())
            .process_payment(session.id, Decimal::new(10005, 3), PaymentMethod::Cash)
            .await
            .unwrap();
        assert_eq!(payment.amount, Decimal::new(1001, 2));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .settlement(SimulatedGateway::approving())
            .process_payment(Uuid::new_v4(), Decimal::TEN, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn declined_charge_records_failure_and_allows_retry() {
        let fx = Fixture::new();
        let session = fx.session(true).await;

        let err = fx
            .settlement(SimulatedGateway::declining("insufficient funds"))
            .process_payment(session.id, Decimal::TEN, PaymentMethod::DebitCard)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PaymentDeclined(_)));

        let paid = fx
            .settlement(SimulatedGateway::approving())
            .process_payment(session.id, Decimal::TEN, PaymentMethod::Cash)
            .await
            .unwrap();
        assert!(paid.is_successful());

        let history = fx.storage.payments().find_for_session(session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, PaymentStatus::Failed);
        assert_eq!(history[0].failure_reason.as_deref(), Some("charge declined: insufficient funds"));
        assert_eq!(
            fx.audit.actions().await,
            vec![ActionCode::PaymentFailed, ActionCode::PaymentProcessed]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_payments_settle_once() {
        let fx = Fixture::new();
        let session = fx.session(true).await;
        let settlement = Arc::new(fx.settlement(SimulatedGateway::approving()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let settlement = settlement.clone();
            handles.push(tokio::spawn(async move {
                settlement
                    .process_payment(session.id, Decimal::TEN, PaymentMethod::Cash)
                    .await
                    .is_ok()
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let paid = fx.storage.payments().find_for_session(session.id).await.unwrap();
        assert_eq!(paid.iter().filter(|p| p.is_successful()).count(), 1);
    }
}
