//! # motorhub-core
//!
//! Marketplace rules with no I/O: entities and their status machines,
//! CPF and contact validation, payment links, and the webhook settlement
//! table. `motorhub-db` persists these types (with the `sqlx` feature) and
//! `marketplace-api` drives them over HTTP.
//!
//! ```text
//!   Vehicle  Available ──register sale──► Reserved ──paid──► Sold
//!                ▲                            │
//!                └────────cancelled───────────┘
//!
//!   Payment  Pending ──paid──► Completed
//!                    └─cancelled─► Cancelled
//! ```
//!
//! ```rust
//! use motorhub_core::validation::{is_valid_document, normalize_document};
//!
//! assert!(is_valid_document("529.982.247-25"));
//! assert_eq!(normalize_document("529.982.247-25"), "52998224725");
//! ```

pub mod error;
pub mod money;
pub mod payment;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{PaymentLinks, PaymentOutcome, Settlement};
pub use types::*;

/// Employee code of the house salesperson, credited when no active
/// salesperson exists. Created on first use.
pub const HOUSE_SALESPERSON_CODE: &str = "SYS001";

pub const HOUSE_SALESPERSON_NAME: &str = "System Sales";

pub const HOUSE_SALESPERSON_EMAIL: &str = "system@motorhub.local";

/// Name given to customers created from a tax id alone.
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

/// Notes attached to every sale registered through the marketplace.
pub const MARKETPLACE_SALE_NOTES: &str = "Sale registered via marketplace";
