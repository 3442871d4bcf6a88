//! Parking session domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifecycle: ACTIVE → COMPLETED (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Real-time occupancy of a spot, bounded by check-in and check-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSession {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Uuid,
    /// Licence plate or other vehicle identifier given at check-in
    pub vehicle_tag: Option<String>,
    /// Reservation honoured by this session, if the user checked in
    /// inside their own booking window
    pub reservation_id: Option<Uuid>,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    /// Billed whole minutes, set at check-out
    pub duration_minutes: Option<i64>,
    pub amount_due: Option<Decimal>,
    pub status: SessionStatus,
}

impl ParkingSession {
    pub fn start(
        spot_id: Uuid,
        user_id: Uuid,
        vehicle_tag: Option<String>,
        check_in_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            spot_id,
            user_id,
            vehicle_tag,
            reservation_id: None,
            check_in_time,
            check_out_time: None,
            duration_minutes: None,
            amount_due: None,
            status: SessionStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whole minutes elapsed between check-in and `at` (never negative).
    pub fn elapsed_minutes(&self, at: DateTime<Utc>) -> i64 {
        (at - self.check_in_time).num_minutes().max(0)
    }

    /// Close the session. A completed session is immutable: returns
    /// `false` and changes nothing if it was already completed.
    pub fn complete(&mut self, at: DateTime<Utc>, amount_due: Decimal) -> bool {
        if !self.is_active() {
            return false;
        }
        self.duration_minutes = Some(self.elapsed_minutes(at));
        self.check_out_time = Some(at);
        self.amount_due = Some(amount_due);
        self.status = SessionStatus::Completed;
        true
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> ParkingSession {
        ParkingSession::start(Uuid::new_v4(), Uuid::new_v4(), Some("ABC-123".into()), Utc::now())
    }

    #[test]
    fn started_session_is_active() {
        let s = sample();
        assert!(s.is_active());
        assert!(s.check_out_time.is_none());
        assert!(s.amount_due.is_none());
        assert_eq!(s.vehicle_tag.as_deref(), Some("ABC-123"));
    }

    #[test]
    fn complete_records_duration_and_amount() {
        let mut s = sample();
        let out = s.check_in_time + Duration::minutes(90) + Duration::seconds(59);
        assert!(s.complete(out, Decimal::new(1500, 2)));
        assert_eq!(s.status, SessionStatus::Completed);
        assert_eq!(s.duration_minutes, Some(90));
        assert_eq!(s.amount_due, Some(Decimal::new(1500, 2)));
        assert_eq!(s.check_out_time, Some(out));
    }

    #[test]
    fn completed_session_is_immutable() {
        let mut s = sample();
        let first = s.check_in_time + Duration::minutes(10);
        s.complete(first, Decimal::ONE);
        assert!(!s.complete(first + Duration::hours(5), Decimal::new(5000, 2)));
        assert_eq!(s.amount_due, Some(Decimal::ONE));
        assert_eq!(s.check_out_time, Some(first));
    }

    #[test]
    fn elapsed_minutes_clamps_clock_skew() {
        let s = sample();
        assert_eq!(s.elapsed_minutes(s.check_in_time - Duration::minutes(3)), 0);
    }
}
