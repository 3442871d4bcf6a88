//! Domain events
//!
//! Event types that represent facts about what happened in the engine.
//! The EventBus implementation lives in `application::events`.

pub mod types;

pub use types::{
    Event, EventMessage, PaymentEvent, ReservationEvent, SessionCompletedEvent,
    SessionStartedEvent, SpotStatusChangedEvent,
};
