use thiserror::Error;

use crate::database::StoreError;
use crate::database::models::TargetId;

/// Failures surfaced by administrative monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("API {0} not found")]
    NotFound(TargetId),
    #[error("an API named '{0}' already exists")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MonitorError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateName(name) => MonitorError::Conflict(name),
            other => MonitorError::Store(other),
        }
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;
