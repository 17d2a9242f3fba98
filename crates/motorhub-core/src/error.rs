//! Domain errors.
//!
//! [`CoreError`] covers what the marketplace rules can reject on their own:
//! bad input, a missing entity, or an entity in the wrong state. Storage
//! failures are `motorhub_db::DbError`; the API wraps both in its
//! `ServiceError` and maps each variant to one HTTP status.

use thiserror::Error;

/// Rule violations. None of these succeed on retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown vehicle id, a transaction id the sale never issued, or a
    /// sale whose vehicle is gone.
    #[error("{entity} with key '{key}' was not found.")]
    NotFound { entity: String, key: String },

    /// Registering a sale for a vehicle that is not Available, editing one
    /// that is not Available, or reusing a VIN or plate.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into())
    }

    /// Edit of a vehicle that has left Available.
    pub fn vehicle_not_editable() -> Self {
        CoreError::conflict("Vehicle can only be edited when status is Available")
    }
}

/// Rejected input. Every variant carries the request field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Email or phone that does not look like one.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Shown to the client verbatim, e.g. `Invalid CPF format`.
    #[error("{message}")]
    Rejected { field: String, message: String },
}

impl ValidationError {
    pub fn rejected(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Rejected {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Rejected { field, .. } => field,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
