//! Engine events
//!
//! Facts published after a state change has been committed. Subscribers
//! (dashboards, push notifications) must treat them as hints and read the
//! current state through the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::spot::SpotStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    SpotStatusChanged(SpotStatusChangedEvent),
    SessionStarted(SessionStartedEvent),
    SessionCompleted(SessionCompletedEvent),
    ReservationCreated(ReservationEvent),
    ReservationCancelled(ReservationEvent),
    PaymentSettled(PaymentEvent),
    PaymentFailed(PaymentEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SpotStatusChanged(_) => "spot_status_changed",
            Event::SessionStarted(_) => "session_started",
            Event::SessionCompleted(_) => "session_completed",
            Event::ReservationCreated(_) => "reservation_created",
            Event::ReservationCancelled(_) => "reservation_cancelled",
            Event::PaymentSettled(_) => "payment_settled",
            Event::PaymentFailed(_) => "payment_failed",
        }
    }

    pub fn spot_id(&self) -> Option<Uuid> {
        match self {
            Event::SpotStatusChanged(e) => Some(e.spot_id),
            Event::SessionStarted(e) => Some(e.spot_id),
            Event::SessionCompleted(e) => Some(e.spot_id),
            Event::ReservationCreated(e) | Event::ReservationCancelled(e) => Some(e.spot_id),
            Event::PaymentSettled(_) | Event::PaymentFailed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotStatusChangedEvent {
    pub spot_id: Uuid,
    pub old_status: SpotStatus,
    pub new_status: SpotStatus,
    pub version: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStartedEvent {
    pub session_id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCompletedEvent {
    pub session_id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Uuid,
    pub duration_minutes: i64,
    pub amount_due: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub reservation_id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub payment_id: Uuid,
    pub session_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_reference: Option<String>,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event::SpotStatusChanged(SpotStatusChangedEvent {
            spot_id: Uuid::nil(),
            old_status: SpotStatus::Available,
            new_status: SpotStatus::Occupied,
            version: 1,
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(EventMessage::new(event)).unwrap();
        assert_eq!(json["type"], "SpotStatusChanged");
        assert_eq!(json["data"]["new_status"], "OCCUPIED");
    }
}
