use thiserror::Error;

/// Failure taxonomy shared by every store-facing operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database unavailable: {0}")]
    Connection(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected database error")]
    Database(#[from] diesel::result::Error),
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<diesel::ConnectionError> for StoreError {
    fn from(err: diesel::ConnectionError) -> Self {
        StoreError::Connection(err.to_string())
    }
}
