//! Domain errors raised by the service layer.

use crate::models::page::InvalidPageRequest;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }
}

impl From<InvalidPageRequest> for ServiceError {
    fn from(e: InvalidPageRequest) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Map a storage uniqueness violation to `AlreadyExists` with a client-facing message.
pub fn on_conflict(message: &'static str) -> impl Fn(StorageError) -> ServiceError {
    move |e| match e {
        StorageError::AlreadyExists { .. } => ServiceError::AlreadyExists(message.to_string()),
        other => ServiceError::Storage(other),
    }
}
