//! # Services
//!
//! Workflows that span several tables. Each service owns a [`Database`]
//! handle and runs its writes inside one transaction.
//!
//! ## Registration Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate document + contact fields         (no I/O)                   │
//! │  BEGIN IMMEDIATE                            write lock, others wait    │
//! │    inventory::reserve_vehicle               Available → Reserved       │
//! │    customer::resolve_or_create              by normalized CPF          │
//! │    salesperson::default_salesperson_id      first active or SYS001     │
//! │    INSERT sale, INSERT payment (pending)                                │
//! │  COMMIT                                     any `?` above rolls back   │
//! │  payment URL                                (no I/O)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Database`]: motorhub_db::Database

pub mod customer;
pub mod inventory;
pub mod payment;
pub mod sale;
pub mod salesperson;
pub mod vehicle;

use motorhub_core::{CoreError, ValidationError};
use motorhub_db::DbError;
use thiserror::Error;

pub use payment::{PaymentService, SettlementOutcome};
pub use sale::{RegisterSale, RegisteredSale, SaleService};
pub use vehicle::VehicleService;

/// Errors returned by services.
///
/// `Domain` errors are the caller's to fix; `Storage` errors are ours.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl ServiceError {
    /// Whether repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Domain(_) => false,
            ServiceError::Storage(err) => err.is_retryable(),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Domain(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Storage(err.into())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
