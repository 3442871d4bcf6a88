//! Spot repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Spot, SpotStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait SpotRepository: Send + Sync {
    /// Save a new spot (admin workflow / seeding). Fails with `Conflict`
    /// if the id or the label is already taken.
    async fn save(&self, spot: Spot) -> DomainResult<()>;

    /// Find spot by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Spot>>;

    /// Find all spots
    async fn find_all(&self) -> DomainResult<Vec<Spot>>;

    /// Atomically move the spot to `new_status` if, and only if, it is
    /// still at `expected_version` and `expected_status`. The version is
    /// incremented on success.
    ///
    /// Returns the updated spot, or `None` when the conditional write
    /// matched nothing (lost race or missing row).
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected_version: i64,
        expected_status: SpotStatus,
        new_status: SpotStatus,
    ) -> DomainResult<Option<Spot>>;
}
