//! Engine services

pub mod activity;
pub mod availability;
pub mod fee;
pub mod payment;
pub mod reservation;
pub mod session;
pub mod spot_registry;

pub use activity::ActivityLogger;
pub use availability::{AvailabilityCache, SpotFilter};
pub use fee::{FeeCalculator, FeeQuote};
pub use payment::PaymentSettlement;
pub use reservation::ReservationScheduler;
pub use session::{CheckoutReceipt, SessionManager};
pub use spot_registry::SpotRegistry;

use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, UserDirectory, UserRecord};

/// Resolve a user that is allowed to park: NotFound if unknown,
/// BadRequest if deactivated.
pub(crate) async fn require_active_user(
    users: &dyn UserDirectory,
    user_id: Uuid,
) -> DomainResult<UserRecord> {
    let user = users
        .find_user(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", user_id))?;
    if !user.is_active {
        return Err(DomainError::BadRequest(format!(
            "User {} is not active",
            user_id
        )));
    }
    Ok(user)
}
