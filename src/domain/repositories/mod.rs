//! Repository access for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` - unified access to all per-aggregate repositories
//! - `DomainResult` - standard result type for domain operations

use super::payment::PaymentRepository;
use super::reservation::ReservationRepository;
use super::session::SessionRepository;
use super::spot::SpotRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all engine repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let spot = repos.spots().find_by_id(spot_id).await?;
///     let active = repos.sessions().find_active_for_user(user_id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn spots(&self) -> &dyn SpotRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn payments(&self) -> &dyn PaymentRepository;
}
