//! Spot aggregate
//!
//! Contains the Spot entity, its status/class enums, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Spot, SpotClass, SpotStatus};
pub use repository::SpotRepository;
