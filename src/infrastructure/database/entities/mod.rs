//! SeaORM entity definitions

pub mod parking_session;
pub mod payment;
pub mod reservation;
pub mod spot;

pub mod prelude {
    pub use super::parking_session::Entity as ParkingSession;
    pub use super::payment::Entity as Payment;
    pub use super::reservation::Entity as Reservation;
    pub use super::spot::Entity as Spot;
}
