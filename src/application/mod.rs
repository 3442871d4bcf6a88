//! Application layer: engine services, event bus and the engine facade

pub mod engine;
pub mod events;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineDeps, ParkingEngine};
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use services::{
    ActivityLogger, AvailabilityCache, CheckoutReceipt, FeeCalculator, FeeQuote,
    PaymentSettlement, ReservationScheduler, SessionManager, SpotFilter, SpotRegistry,
};
