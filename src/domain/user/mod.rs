//! User directory port
//!
//! Users are owned by an external identity service; the engine only needs
//! to know whether an id exists and is allowed to park.

pub mod model;
pub mod repository;

pub use model::UserRecord;
pub use repository::UserDirectory;
