//! SeaORM implementation of PaymentRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    UpdateResult,
};
use tracing::debug;
use uuid::Uuid;

use super::{corrupt, db_err, from_cents, is_unique_violation, parse_id, to_cents};
use crate::domain::payment::{Payment, PaymentMethod, PaymentRepository, PaymentStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// PENDING → `status`, or Conflict if the payment is not PENDING
    async fn settle(
        &self,
        id: Uuid,
        status: PaymentStatus,
        transaction_reference: Option<&str>,
        failure_reason: Option<&str>,
    ) -> DomainResult<Payment> {
        let mut update = payment::Entity::update_many()
            .col_expr(payment::Column::Status, Expr::value(status.as_str()))
            .col_expr(payment::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(reference) = transaction_reference {
            update = update.col_expr(
                payment::Column::TransactionReference,
                Expr::value(reference.to_string()),
            );
        }
        if let Some(reason) = failure_reason {
            update = update.col_expr(payment::Column::FailureReason, Expr::value(reason.to_string()));
        }
        if !status.holds_settlement() {
            update = update.col_expr(payment::Column::SettlementKey, Expr::value(Option::<String>::None));
        }

        let result: UpdateResult = update
            .filter(payment::Column::Id.eq(id.to_string()))
            .filter(payment::Column::Status.eq(PaymentStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Payment", id))?;
        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!(
                "Payment {} is {}, not PENDING",
                id, current.status
            )));
        }
        Ok(current)
    }
}

fn model_to_domain(m: payment::Model) -> DomainResult<Payment> {
    Ok(Payment {
        id: parse_id("Payment", &m.id)?,
        session_id: parse_id("ParkingSession", &m.session_id)?,
        amount: from_cents(m.amount_cents),
        method: PaymentMethod::from_str(&m.method)
            .ok_or_else(|| corrupt("Payment", "method", &m.method))?,
        status: PaymentStatus::from_str(&m.status)
            .ok_or_else(|| corrupt("Payment", "status", &m.status))?,
        currency: m.currency,
        transaction_reference: m.transaction_reference,
        failure_reason: m.failure_reason,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn insert_pending(&self, p: Payment) -> DomainResult<()> {
        debug!(payment_id = %p.id, session_id = %p.session_id, "Claiming settlement slot");

        let model = payment::ActiveModel {
            id: Set(p.id.to_string()),
            session_id: Set(p.session_id.to_string()),
            amount_cents: Set(to_cents(p.amount)?),
            currency: Set(p.currency),
            method: Set(p.method.as_str().to_string()),
            status: Set(PaymentStatus::Pending.as_str().to_string()),
            transaction_reference: Set(None),
            failure_reason: Set(None),
            settlement_key: Set(Some(p.session_id.to_string())),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        };
        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict(
                    "Session already has a payment in progress or settled".to_string(),
                )
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    async fn mark_succeeded(&self, id: Uuid, transaction_reference: &str) -> DomainResult<Payment> {
        self.settle(id, PaymentStatus::Success, Some(transaction_reference), None)
            .await
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> DomainResult<Payment> {
        self.settle(id, PaymentStatus::Failed, None, Some(reason)).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        payment::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_for_session(&self, session_id: Uuid) -> DomainResult<Vec<Payment>> {
        payment::Entity::find()
            .filter(payment::Column::SessionId.eq(session_id.to_string()))
            .order_by_asc(payment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{ParkingSession, SessionRepository};
    use crate::domain::spot::{Spot, SpotClass, SpotRepository};
    use crate::infrastructure::database::repositories::{
        test_db, SeaOrmSessionRepository, SeaOrmSpotRepository,
    };
    use chrono::Duration;
    use rust_decimal::Decimal;

    async fn setup() -> (SeaOrmPaymentRepository, Uuid) {
        let db = test_db::connect().await;
        let spot = Spot::new("A1", SpotClass::Standard);
        SeaOrmSpotRepository::new(db.clone()).save(spot.clone()).await.unwrap();
        let session = ParkingSession::start(spot.id, Uuid::new_v4(), None, Utc::now());
        SeaOrmSessionRepository::new(db.clone())
            .insert_active(session.clone())
            .await
            .unwrap();
        (SeaOrmPaymentRepository::new(db), session.id)
    }

    fn pending(session_id: Uuid, offset_secs: i64) -> Payment {
        Payment::pending(
            session_id,
            Decimal::new(1517, 2),
            "USD",
            PaymentMethod::CreditCard,
            Utc::now() + Duration::seconds(offset_secs),
        )
    }

    #[tokio::test]
    async fn one_open_settlement_per_session() {
        let (repo, session) = setup().await;
        let first = pending(session, 0);
        repo.insert_pending(first.clone()).await.unwrap();

        let err = repo.insert_pending(pending(session, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let failed = repo.mark_failed(first.id, "declined").await.unwrap();
        assert_eq!(failed.status, PaymentStatus::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("declined"));

        let second = pending(session, 2);
        repo.insert_pending(second.clone()).await.unwrap();
        let paid = repo.mark_succeeded(second.id, "TXN-ABCDEF01").await.unwrap();
        assert!(paid.is_successful());
        assert_eq!(paid.amount, Decimal::new(1517, 2));
        assert_eq!(paid.transaction_reference.as_deref(), Some("TXN-ABCDEF01"));

        // SUCCESS keeps the slot
        assert!(repo.insert_pending(pending(session, 3)).await.is_err());

        let history = repo.find_for_session(session).await.unwrap();
        assert_eq!(
            history.iter().map(|p| p.status).collect::<Vec<_>>(),
            vec![PaymentStatus::Failed, PaymentStatus::Success]
        );
    }

    #[tokio::test]
    async fn settling_twice_conflicts() {
        let (repo, session) = setup().await;
        let p = pending(session, 0);
        repo.insert_pending(p.clone()).await.unwrap();
        repo.mark_succeeded(p.id, "TXN-00000001").await.unwrap();

        assert!(matches!(
            repo.mark_failed(p.id, "late").await.unwrap_err(),
            DomainError::Conflict(_)
        ));
        assert!(matches!(
            repo.mark_succeeded(Uuid::new_v4(), "TXN-00000002").await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
