//! Payment aggregate
//!
//! Contains the Payment entity, the repository interface and the gateway port.

pub mod gateway;
pub mod model;
pub mod repository;

pub use gateway::{GatewayError, PaymentGateway};
pub use model::{Payment, PaymentMethod, PaymentStatus};
pub use repository::PaymentRepository;
