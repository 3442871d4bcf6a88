//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::payment::PaymentRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::session::SessionRepository;
use crate::domain::spot::SpotRepository;

use super::payment_repository::SeaOrmPaymentRepository;
use super::reservation_repository::SeaOrmReservationRepository;
use super::session_repository::SeaOrmSessionRepository;
use super::spot_repository::SeaOrmSpotRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let spot = repos.spots().find_by_id(spot_id).await?;
/// let active = repos.sessions().find_active_for_user(user_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    spots: SeaOrmSpotRepository,
    sessions: SeaOrmSessionRepository,
    reservations: SeaOrmReservationRepository,
    payments: SeaOrmPaymentRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            spots: SeaOrmSpotRepository::new(db.clone()),
            sessions: SeaOrmSessionRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            payments: SeaOrmPaymentRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn spots(&self) -> &dyn SpotRepository {
        &self.spots
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }
}
