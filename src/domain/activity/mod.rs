//! Activity (audit) log port
//!
//! Every engine operation reports what it did to an [`AuditSink`]. Sinks
//! are fire-and-forget from the engine's point of view: a failing sink
//! never aborts the operation that produced the entry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainResult;

/// Audit action codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    CheckIn,
    CheckOut,
    ReservationCreated,
    ReservationCancelled,
    PaymentProcessed,
    PaymentFailed,
}

impl ActionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "CHECK_IN",
            Self::CheckOut => "CHECK_OUT",
            Self::ReservationCreated => "RESERVATION_CREATED",
            Self::ReservationCancelled => "RESERVATION_CANCELLED",
            Self::PaymentProcessed => "PAYMENT_PROCESSED",
            Self::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl std::fmt::Display for ActionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub actor_id: Uuid,
    pub action: ActionCode,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log(&self, actor_id: Uuid, action: ActionCode, details: &str) -> DomainResult<()>;
}
