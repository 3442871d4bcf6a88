//! Fire-and-forget audit logging

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::{ActionCode, AuditSink};

/// Wraps an [`AuditSink`] so a failing sink never aborts an operation
#[derive(Clone)]
pub struct ActivityLogger {
    sink: Arc<dyn AuditSink>,
}

impl ActivityLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, actor_id: Uuid, action: ActionCode, details: impl AsRef<str>) {
        let details = details.as_ref();
        if let Err(e) = self.sink.log(actor_id, action, details).await {
            warn!(
                %actor_id,
                action = action.as_str(),
                error = %e,
                "Audit sink rejected entry; continuing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, DomainResult};
    use async_trait::async_trait;

    struct BrokenSink;

    #[async_trait]
    impl AuditSink for BrokenSink {
        async fn log(&self, _: Uuid, _: ActionCode, _: &str) -> DomainResult<()> {
            Err(DomainError::Storage("audit store offline".into()))
        }
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let logger = ActivityLogger::new(Arc::new(BrokenSink));
        logger
            .record(Uuid::new_v4(), ActionCode::CheckIn, "spot A1")
            .await;
    }
}
