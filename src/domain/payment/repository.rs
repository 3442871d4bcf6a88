//! Payment repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Payment;
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a PENDING payment, claiming the session's settlement slot.
    ///
    /// Fails with `Conflict` if another PENDING or SUCCESS payment already
    /// holds the slot. This is the storage-level uniqueness guarantee that
    /// at most one SUCCESS payment exists per session.
    async fn insert_pending(&self, payment: Payment) -> DomainResult<()>;

    /// Mark a PENDING payment as SUCCESS with the gateway reference.
    async fn mark_succeeded(&self, id: Uuid, transaction_reference: &str) -> DomainResult<Payment>;

    /// Mark a PENDING payment as FAILED, releasing the settlement slot.
    async fn mark_failed(&self, id: Uuid, reason: &str) -> DomainResult<Payment>;

    /// Find payment by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>>;

    /// All payments recorded for a session, oldest first
    async fn find_for_session(&self, session_id: Uuid) -> DomainResult<Vec<Payment>>;
}
