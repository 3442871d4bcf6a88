//! Payment gateway port

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use super::model::PaymentMethod;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("charge declined: {0}")]
    Declined(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Charges money through an external provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` using `method`; returns the provider's transaction
    /// reference on success.
    async fn charge(&self, amount: Decimal, method: PaymentMethod) -> Result<String, GatewayError>;
}
