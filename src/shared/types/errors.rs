use thiserror::Error;
use uuid::Uuid;

/// Coarse classification a request layer maps onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    BadRequest,
    Internal,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A compare-and-swap lost the race: the row moved past `expected`.
    #[error("Stale version: {entity} {id} is no longer at version {expected}")]
    StaleVersion {
        entity: &'static str,
        id: String,
        expected: i64,
    },

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// Checkout released the spot and completed the session, but settlement failed.
    #[error("Session {session_id} checked out but settlement failed: {source}")]
    SettlementFailed {
        session_id: Uuid,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Conflict(_) | Self::StaleVersion { .. } | Self::PaymentDeclined(_) => {
                ErrorKind::Conflict
            }
            Self::SettlementFailed { source, .. } => source.kind(),
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error is likely transient and the operation may
    /// succeed if retried against fresh state.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StaleVersion { .. })
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
