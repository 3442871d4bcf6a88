//! Spot domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Occupancy status of a physical spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl SpotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Occupied => "OCCUPIED",
            Self::Reserved => "RESERVED",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Some(Self::Available),
            "OCCUPIED" => Some(Self::Occupied),
            "RESERVED" => Some(Self::Reserved),
            "MAINTENANCE" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl Default for SpotStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing class of a spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotClass {
    Standard,
    Vip,
    Handicap,
    EvCharging,
}

impl SpotClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Vip => "VIP",
            Self::Handicap => "HANDICAP",
            Self::EvCharging => "EV_CHARGING",
        }
    }

    /// Parse a class label. Unknown or empty labels resolve to `Standard`,
    /// so classification can never make pricing fail.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "VIP" => Self::Vip,
            "HANDICAP" => Self::Handicap,
            "EV_CHARGING" | "EV" => Self::EvCharging,
            _ => Self::Standard,
        }
    }
}

impl Default for SpotClass {
    fn default() -> Self {
        Self::Standard
    }
}

impl std::fmt::Display for SpotClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single physical parking space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: Uuid,
    /// Human-facing label, e.g. "A1"
    pub label: String,
    pub class: SpotClass,
    pub status: SpotStatus,
    /// Bumped on every status transition; drives compare-and-swap.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Spot {
    pub fn new(label: impl Into<String>, class: SpotClass) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            class,
            status: SpotStatus::Available,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SpotStatus::Available
    }

    /// Apply a transition in place if the spot is still at the expected
    /// status and version. Returns whether the transition happened.
    pub fn transition(
        &mut self,
        expected_version: i64,
        expected_status: SpotStatus,
        new_status: SpotStatus,
        at: DateTime<Utc>,
    ) -> bool {
        if self.version != expected_version || self.status != expected_status {
            return false;
        }
        self.status = new_status;
        self.version += 1;
        self.updated_at = at;
        true
    }
}

// ── Tests ──────────────────────────────────────────────────────
