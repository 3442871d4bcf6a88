//! Process bootstrap: tracing and engine assembly

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::application::{EngineDeps, ParkingEngine};
use crate::config::AppConfig;
use crate::domain::{AuditSink, PaymentGateway, UserDirectory};
use crate::infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryStorage, SeaOrmRepositoryProvider,
    SimulatedGateway, TracingAuditSink,
};
use crate::shared::errors::{AppError, InfraError};
use crate::shared::time::SystemClock;

pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Engine over DashMap storage, with tracing audit and the simulated gateway
pub fn in_memory_engine(config: &AppConfig, users: Arc<dyn UserDirectory>) -> ParkingEngine {
    ParkingEngine::new(
        EngineDeps {
            repos: Arc::new(InMemoryStorage::new()),
            users,
            audit: Arc::new(TracingAuditSink),
            gateway: Arc::new(SimulatedGateway::approving()),
            clock: Arc::new(SystemClock),
        },
        config,
    )
}

/// Connect to `db_config`, apply migrations and build an engine over it
pub async fn database_engine(
    config: &AppConfig,
    db_config: &DatabaseConfig,
    users: Arc<dyn UserDirectory>,
    audit: Arc<dyn AuditSink>,
    gateway: Arc<dyn PaymentGateway>,
) -> Result<(ParkingEngine, DatabaseConnection), AppError> {
    let db = init_database(db_config).await.map_err(InfraError::from)?;
    run_migrations(&db).await.map_err(InfraError::from)?;

    let engine = ParkingEngine::new(
        EngineDeps {
            repos: Arc::new(SeaOrmRepositoryProvider::new(db.clone())),
            users,
            audit,
            gateway,
            clock: Arc::new(SystemClock),
        },
        config,
    );
    info!("Parking engine ready");
    Ok((engine, db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SpotFilter;
    use crate::domain::{DomainError, PaymentMethod, SessionStatus, SpotClass, SpotStatus, UserRecord};
    use crate::infrastructure::{InMemoryUserDirectory, MemoryAuditSink};

    #[tokio::test]
    async fn database_engine_runs_a_full_stay() {
        let user = uuid::Uuid::new_v4();
        let users = Arc::new(InMemoryUserDirectory::with_users([UserRecord::active(user)]));
        let (engine, _db) = database_engine(
            &AppConfig::default(),
            &DatabaseConfig::in_memory(),
            users,
            Arc::new(MemoryAuditSink::new()),
            Arc::new(SimulatedGateway::approving()),
        )
        .await
        .unwrap();

        let spot = engine.register_spot("A1", SpotClass::Standard).await.unwrap();
        let session = engine.check_in(user, spot.id, None).await.unwrap();
        assert!(engine
            .available_spots(SpotFilter::available())
            .await
            .unwrap()
            .is_empty());

        let err = engine.check_in(user, spot.id, None).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let receipt = engine.check_out(session.id, PaymentMethod::Cash).await.unwrap();
        assert_eq!(receipt.session.status, SessionStatus::Completed);
        assert!(receipt.payment.unwrap().is_successful());
        assert_eq!(
            engine.registry().get(spot.id).await.unwrap().status,
            SpotStatus::Available
        );

        let again = engine.check_out(session.id, PaymentMethod::Cash).await.unwrap_err();
        assert!(matches!(again, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn database_engine_refuses_sub_cent_settlement() {
        let user = uuid::Uuid::new_v4();
        let users = Arc::new(InMemoryUserDirectory::with_users([UserRecord::active(user)]));
        let mut config = AppConfig::default();
        config.pricing.minimum_fee = rust_decimal::Decimal::ZERO;
        let (engine, _db) = database_engine(
            &config,
            &DatabaseConfig::in_memory(),
            users,
            Arc::new(MemoryAuditSink::new()),
            Arc::new(SimulatedGateway::approving()),
        )
        .await
        .unwrap();

        let spot = engine.register_spot("A1", SpotClass::Standard).await.unwrap();
        let session = engine.check_in(user, spot.id, None).await.unwrap();
        let receipt = engine.check_out(session.id, PaymentMethod::Cash).await.unwrap();
        assert!(receipt.payment.is_none());

        let err = engine
            .process_payment(session.id, rust_decimal::Decimal::new(4, 3), PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(engine
            .settlement()
            .payments_for_session(session.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn in_memory_engine_lists_spots() {
        let engine = in_memory_engine(&AppConfig::default(), Arc::new(InMemoryUserDirectory::new()));
        engine.register_spot("V1", SpotClass::Vip).await.unwrap();
        assert_eq!(engine.registry().list().await.unwrap().len(), 1);
    }
}
