//! Simulated payment gateway

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{GatewayError, PaymentGateway, PaymentMethod};

/// In-process stand-in for a card processor.
///
/// Approves every charge with a `TXN-XXXXXXXX` reference unless built with
/// [`SimulatedGateway::declining`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway {
    decline_reason: Option<String>,
}

impl SimulatedGateway {
    pub fn approving() -> Self {
        Self::default()
    }

    pub fn declining(reason: impl Into<String>) -> Self {
        Self {
            decline_reason: Some(reason.into()),
        }
    }
}

/// `TXN-` followed by 8 uppercase hex characters
pub fn transaction_reference() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("TXN-{}", hex[..8].to_uppercase())
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount: Decimal, method: PaymentMethod) -> Result<String, GatewayError> {
        if let Some(reason) = &self.decline_reason {
            debug!(%amount, %method, reason = reason.as_str(), "Simulated charge declined");
            return Err(GatewayError::Declined(reason.clone()));
        }
        let reference = transaction_reference();
        debug!(%amount, %method, reference = reference.as_str(), "Simulated charge approved");
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_format() {
        let r = transaction_reference();
        assert_eq!(r.len(), 12);
        assert!(r.starts_with("TXN-"));
        assert!(r[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[tokio::test]
    async fn declining_gateway_returns_reason() {
        let gw = SimulatedGateway::declining("card expired");
        let err = gw.charge(Decimal::TEN, PaymentMethod::CreditCard).await.unwrap_err();
        assert_eq!(err, GatewayError::Declined("card expired".into()));
    }
}
