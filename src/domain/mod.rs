//! Domain layer: entities, status machines and the ports the engine
//! depends on. No I/O lives here.

pub mod activity;
pub mod events;
pub mod payment;
pub mod repositories;
pub mod reservation;
pub mod session;
pub mod spot;
pub mod user;

pub use activity::{ActionCode, ActivityEntry, AuditSink};
pub use payment::{GatewayError, Payment, PaymentGateway, PaymentMethod, PaymentRepository, PaymentStatus};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{Reservation, ReservationRepository, ReservationStatus};
pub use session::{ParkingSession, SessionRepository, SessionStatus};
pub use spot::{Spot, SpotClass, SpotRepository, SpotStatus};
pub use user::{UserDirectory, UserRecord};

pub use crate::shared::errors::DomainError;
