//! Audit sinks

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::domain::{ActionCode, ActivityEntry, AuditSink, DomainResult};

/// Writes audit entries as structured log events on the `audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn log(&self, actor_id: Uuid, action: ActionCode, details: &str) -> DomainResult<()> {
        info!(target: "audit", %actor_id, action = action.as_str(), details, "activity");
        Ok(())
    }
}

/// Keeps audit entries in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: RwLock<Vec<ActivityEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.read().await.clone()
    }

    pub async fn actions(&self) -> Vec<ActionCode> {
        self.entries.read().await.iter().map(|e| e.action).collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn log(&self, actor_id: Uuid, action: ActionCode, details: &str) -> DomainResult<()> {
        self.entries.write().await.push(ActivityEntry {
            actor_id,
            action,
            details: details.to_string(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_keeps_order() {
        let sink = MemoryAuditSink::new();
        let actor = Uuid::new_v4();
        sink.log(actor, ActionCode::CheckIn, "in").await.unwrap();
        sink.log(actor, ActionCode::CheckOut, "out").await.unwrap();

        assert_eq!(sink.actions().await, vec![ActionCode::CheckIn, ActionCode::CheckOut]);
        assert_eq!(sink.entries().await[1].details, "out");
    }
}
