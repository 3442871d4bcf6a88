//! Reservation domain entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Booked, window not yet honoured
    Pending,
    /// The owner checked in inside the window
    Active,
    /// The honouring session checked out
    Completed,
    /// Cancelled by the user or an operator
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that hold their time window against other bookings
    pub const HOLDING: [ReservationStatus; 2] = [Self::Pending, Self::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_holding(&self) -> bool {
        Self::HOLDING.contains(self)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Future time-window hold on a spot, over the half-open interval
/// `[start_time, end_time)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// New PENDING reservation over `[start_time, start_time + duration)`.
    ///
    /// Fails with `BadRequest` when the window end is not representable.
    pub fn new(
        spot_id: Uuid,
        user_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let end_time = Duration::try_minutes(duration_minutes)
            .and_then(|d| start_time.checked_add_signed(d))
            .ok_or_else(|| {
                DomainError::BadRequest(format!(
                    "Reservation duration of {} minutes is out of range",
                    duration_minutes
                ))
            })?;
        Ok(Self {
            id: Uuid::new_v4(),
            spot_id,
            user_id,
            start_time,
            end_time,
            status: ReservationStatus::Pending,
            created_at,
            updated_at: created_at,
        })
    }

    /// Half-open interval overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Whether `at` falls inside `[start_time, end_time)`
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at < self.end_time
    }

    /// Whether this reservation blocks `[start, end)` for other bookings
    pub fn holds(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status.is_holding() && self.overlaps(start, end)
    }

    pub fn activate(&mut self, at: DateTime<Utc>) {
        self.status = ReservationStatus::Active;
        self.updated_at = at;
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = ReservationStatus::Completed;
        self.updated_at = at;
    }

    pub fn cancel(&mut self, at: DateTime<Utc>) {
        self.status = ReservationStatus::Cancelled;
        self.updated_at = at;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn at_hours(base: DateTime<Utc>, spot: Uuid, from: i64, to: i64) -> Reservation {
        Reservation::new(spot, Uuid::new_v4(), base + Duration::hours(from), (to - from) * 60, base).unwrap()
    }

    #[test]
    fn new_reservation_is_pending_with_computed_end() {
        let now = Utc::now();
        let r = Reservation::new(Uuid::new_v4(), Uuid::new_v4(), now, 90, now).unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.end_time - r.start_time, Duration::minutes(90));
    }

    #[test]
    fn unrepresentable_window_end_is_a_bad_request() {
        let now = Utc::now();
        for minutes in [1_000_000_000_000, i64::MAX] {
            let err = Reservation::new(Uuid::new_v4(), Uuid::new_v4(), now, minutes, now).unwrap_err();
            assert!(matches!(err, DomainError::BadRequest(_)));
        }
    }

    #[test]
    fn overlapping_windows_are_detected() {
        let base = Utc::now();
        let r = at_hours(base, Uuid::new_v4(), 1, 3);
        assert!(r.overlaps(base + Duration::hours(2), base + Duration::hours(4)));
        assert!(r.overlaps(base, base + Duration::hours(5)));
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let base = Utc::now();
        let r = at_hours(base, Uuid::new_v4(), 1, 2);
        assert!(!r.overlaps(base + Duration::hours(2), base + Duration::hours(3)));
        assert!(!r.overlaps(base, base + Duration::hours(1)));
    }

    #[test]
    fn cancelled_reservation_holds_nothing() {
        let base = Utc::now();
        let mut r = at_hours(base, Uuid::new_v4(), 1, 3);
        r.cancel(base);
        assert!(!r.holds(base + Duration::hours(1), base + Duration::hours(2)));
    }

    #[test]
    fn covers_is_half_open() {
        let base = Utc::now();
        let r = at_hours(base, Uuid::new_v4(), 1, 2);
        assert!(r.covers(base + Duration::hours(1)));
        assert!(!r.covers(base + Duration::hours(2)));
    }

    #[test]
    fn status_roundtrip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Active,
            ReservationStatus::Completed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::from_str("Accepted"), None);
    }
}
