//! Application events (pub/sub)
//!
//! Event types live in `domain::events`; the broadcast bus lives here.

pub mod event_bus;

pub use crate::domain::events::types;
pub use crate::domain::events::types::*;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
