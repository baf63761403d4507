use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::models::FieldError;

/// Observer pipeline errors; each maps onto one HTTP status
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Validation error: {message}")]
    Validation { message: String, errors: Vec<FieldError> },

    /// A reference that does not resolve, or a member set that breaks a domain rule
    #[error("{0}")]
    InvalidReference(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Timeout error: {0}")]
    Timeout(String),
}

impl ObserverError {
    pub fn validation(message: impl Into<String>) -> Self {
        ObserverError::Validation { message: message.into(), errors: vec![] }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        ObserverError::Validation {
            message: format!("{field} {message}"),
            errors: vec![FieldError::new(field, message)],
        }
    }
}
