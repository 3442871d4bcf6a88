use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal view of a user as seen by the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub is_active: bool,
}

impl UserRecord {
    pub fn active(id: Uuid) -> Self {
        Self { id, is_active: true }
    }
}
