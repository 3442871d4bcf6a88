//! In-memory repositories

mod memory;

pub use memory::{InMemoryStorage, InMemoryUserDirectory};
