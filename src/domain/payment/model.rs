//! Payment domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Settlement slot claimed, gateway not yet answered
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether a payment in this status occupies the session's single
    /// settlement slot
    pub fn holds_settlement(&self) -> bool {
        matches!(self, Self::Pending | Self::Success)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::Upi => "UPI",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "CREDIT_CARD" => Some(Self::CreditCard),
            "DEBIT_CARD" => Some(Self::DebitCard),
            "UPI" => Some(Self::Upi),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Charge recorded against a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub session_id: Uuid,
    pub amount: Decimal,
    /// ISO 4217
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_reference: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn pending(
        session_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            amount,
            currency: currency.into(),
            method,
            status: PaymentStatus::Pending,
            transaction_reference: None,
            failure_reason: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_payment_holds_the_settlement_slot() {
        let p = Payment::pending(Uuid::new_v4(), Decimal::TEN, "USD", PaymentMethod::Cash, Utc::now());
        assert_eq!(p.status, PaymentStatus::Pending);
        assert!(p.status.holds_settlement());
        assert!(!p.is_successful());
        assert!(p.transaction_reference.is_none());
    }

    #[test]
    fn failed_payment_releases_the_slot() {
        assert!(!PaymentStatus::Failed.holds_settlement());
        assert!(PaymentStatus::Success.holds_settlement());
    }

    #[test]
    fn method_parse_accepts_any_case() {
        assert_eq!(PaymentMethod::from_str("credit_card"), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::from_str("cheque"), None);
    }
}
