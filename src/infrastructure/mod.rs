//! Infrastructure layer - external concerns

pub mod audit;
pub mod database;
pub mod gateway;
pub mod storage;

pub use audit::{MemoryAuditSink, TracingAuditSink};
pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
pub use gateway::SimulatedGateway;
pub use storage::{InMemoryStorage, InMemoryUserDirectory};
