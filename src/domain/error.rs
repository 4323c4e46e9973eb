use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the roster domain
///
/// `NotFound` and `InsufficientBalance` are client mistakes; nothing was
/// written when they are returned. `ConcurrencyConflict` is transient: the
/// whole operation is safe to retry from scratch.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("The team does not exist by this id: {0}")]
    TeamNotFound(Uuid),

    #[error("The player does not exist by this id: {0}")]
    PlayerNotFound(Uuid),

    #[error("Insufficient balance: team {team_id} holds {available} but the transfer fee is {required}")]
    InsufficientBalance {
        team_id: Uuid,
        available: Decimal,
        required: Decimal,
    },

    #[error("Player age must be greater than zero to price a transfer")]
    InvalidAge,

    #[error("The transfer could not be applied against concurrent updates; retry the request")]
    ConcurrencyConflict,

    #[error("Storage error: {0}")]
    Store(String),
}

impl From<crate::domain::repositories::StoreError> for DomainError {
    fn from(err: crate::domain::repositories::StoreError) -> Self {
        use crate::domain::repositories::StoreError;

        match err {
            StoreError::Conflict => DomainError::ConcurrencyConflict,
            StoreError::Database(message) => DomainError::Store(message),
        }
    }
}
