//! # ParkNexus engine
//!
//! Parking spot occupancy and reservation engine: spot status under
//! optimistic concurrency, check-in / check-out sessions, time-window
//! reservations, per-class fee calculation and idempotent payment
//! settlement.
//!
//! ## Architecture
//!
//! - **domain**: entities, status machines and the ports the engine depends on
//! - **application**: engine services, the event bus and the `ParkingEngine` facade
//! - **infrastructure**: DashMap and SeaORM repositories, audit sinks, simulated gateway
//! - **shared**: error taxonomy, bounded retry, clock
//! - **config** / **runtime**: TOML configuration, tracing and bootstrap

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod shared;

pub use application::{CheckoutReceipt, FeeCalculator, FeeQuote, ParkingEngine, SpotFilter};
pub use config::{default_config_path, AppConfig, ConfigError};
pub use shared::errors::{AppError, DomainError, ErrorKind};
