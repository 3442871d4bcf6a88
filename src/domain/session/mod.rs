//! Parking session aggregate
//!
//! Contains the ParkingSession entity and repository interface.

pub mod model;
pub mod repository;

pub use model::{ParkingSession, SessionStatus};
pub use repository::SessionRepository;
