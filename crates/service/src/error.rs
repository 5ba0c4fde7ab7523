#![forbid(unsafe_code)]

use fo_core::ids::CompanyIdError;
use fo_core::status::StatusParseError;
use fo_storage::StoreError;

#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input; safe to show to the caller.
    Validation(String),
    /// The actor lacks the capability the operation requires.
    Forbidden(&'static str),
    /// Job not found within the actor's company.
    NotFound,
    Store(StoreError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(message) => write!(f, "validation: {message}"),
            ServiceError::Forbidden(capability) => {
                write!(f, "forbidden: requires capability {capability}")
            }
            ServiceError::NotFound => write!(f, "job not found"),
            ServiceError::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownId => ServiceError::NotFound,
            StoreError::InvalidInput(message) => ServiceError::Validation(message.to_string()),
            other => ServiceError::Store(other),
        }
    }
}

impl From<CompanyIdError> for ServiceError {
    fn from(err: CompanyIdError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<StatusParseError> for ServiceError {
    fn from(err: StatusParseError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
