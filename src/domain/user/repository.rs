use async_trait::async_trait;
use uuid::Uuid;

use super::UserRecord;
use crate::domain::DomainResult;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> DomainResult<Option<UserRecord>>;
}
