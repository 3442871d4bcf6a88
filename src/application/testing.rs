//! Shared fixtures for engine tests

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::application::engine::{EngineDeps, ParkingEngine};
use crate::config::AppConfig;
use crate::domain::{PaymentGateway, UserRecord};
use crate::infrastructure::audit::MemoryAuditSink;
use crate::infrastructure::gateway::SimulatedGateway;
use crate::infrastructure::storage::{InMemoryStorage, InMemoryUserDirectory};
use crate::shared::time::{Clock, ManualClock};

pub(crate) struct Harness {
    pub engine: ParkingEngine,
    pub storage: Arc<InMemoryStorage>,
    pub users: Arc<InMemoryUserDirectory>,
    pub audit: Arc<MemoryAuditSink>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_gateway(Arc::new(SimulatedGateway::approving()))
    }

    pub fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        let storage = Arc::new(InMemoryStorage::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let clock = ManualClock::default();

        let mut config = AppConfig::default();
        config.engine.cas_retry_delay_ms = 0;

        let engine = ParkingEngine::new(
            EngineDeps {
                repos: storage.clone(),
                users: users.clone(),
                audit: audit.clone(),
                gateway,
                clock: Arc::new(clock.clone()),
            },
            &config,
        );
        Self {
            engine,
            storage,
            users,
            audit,
            clock,
        }
    }

    pub fn user(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.users.upsert(UserRecord::active(id));
        id
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }
}
