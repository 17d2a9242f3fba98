//! # Payment Rules
//!
//! Everything the sale registrar and the webhook reconciler decide without
//! touching storage.
//!
//! ## Settlement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  webhook status ──parse──► PaymentOutcome { Paid | Cancelled }          │
//! │        │                          │                                     │
//! │        └── anything else ──► ValidationError("Status", ...)             │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  settle(outcome, payment.status, vehicle.status)                        │
//! │                                                                         │
//! │   Pending + Reserved + Paid       ──► Apply(Completed, Sold)            │
//! │   Pending + Reserved + Cancelled  ──► Apply(Cancelled, Available)       │
//! │   already at the outcome's status ──► AlreadyApplied                    │
//! │   anything else                   ──► Ignored(reason)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both no-op results are successes: gateways redeliver webhooks and a
//! redelivery must not fail or flip state back.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{PaymentStatus, PaymentType, VehicleStatus};

// =============================================================================
// Transaction Ids
// =============================================================================

/// External transaction id for a sale: `PAY_` followed by the 32 lowercase
/// hex digits of the sale id.
///
/// ## Example
/// ```rust
/// use motorhub_core::payment::transaction_id;
/// use uuid::Uuid;
///
/// let sale_id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
/// assert_eq!(transaction_id(sale_id), "PAY_67e5504410b1426f9247bb680e5fe0c8");
/// ```
pub fn transaction_id(sale_id: Uuid) -> String {
    format!("PAY_{}", sale_id.simple())
}

/// Notes stored on the pending payment of a marketplace sale.
pub fn pending_notes(payment_type: PaymentType) -> String {
    format!("Payment pending for marketplace sale - {payment_type}")
}

// =============================================================================
// Payment Links
// =============================================================================

/// Base URLs of the hosted payment pages handed back to the buyer.
///
/// Loaded from configuration; the defaults are placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentLinks {
    /// Card and bank transfer gateway, e.g. `https://payment-gateway.com`.
    pub card_gateway: String,
    /// Financing partner, e.g. `https://financing-partner.com`.
    pub financing_partner: String,
}

impl Default for PaymentLinks {
    fn default() -> Self {
        PaymentLinks {
            card_gateway: "https://payment-gateway.com".to_string(),
            financing_partner: "https://financing-partner.com".to_string(),
        }
    }
}

impl PaymentLinks {
    /// URL the buyer follows to pay, or `None` for in-person methods.
    ///
    /// | type          | url                                        |
    /// |---------------|--------------------------------------------|
    /// | CreditCard    | `{card_gateway}/credit-card/{tx}`          |
    /// | DebitCard     | `{card_gateway}/debit-card/{tx}`           |
    /// | BankTransfer  | `{card_gateway}/bank-transfer/{tx}`        |
    /// | Financing     | `{financing_partner}/process/{tx}`         |
    /// | Cash, Check   | none                                       |
    pub fn url_for(&self, payment_type: PaymentType, transaction_id: &str) -> Option<String> {
        let (base, path) = match payment_type {
            PaymentType::CreditCard => (&self.card_gateway, "credit-card"),
            PaymentType::DebitCard => (&self.card_gateway, "debit-card"),
            PaymentType::BankTransfer => (&self.card_gateway, "bank-transfer"),
            PaymentType::Financing => (&self.financing_partner, "process"),
            PaymentType::Cash | PaymentType::Check => return None,
        };

        Some(format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            path,
            transaction_id
        ))
    }
}

// =============================================================================
// Webhook Outcome
// =============================================================================

/// What the gateway reports happened to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Paid,
    Cancelled,
}

impl PaymentOutcome {
    /// Status the payment ends in.
    pub const fn payment_status(&self) -> PaymentStatus {
        match self {
            PaymentOutcome::Paid => PaymentStatus::Completed,
            PaymentOutcome::Cancelled => PaymentStatus::Cancelled,
        }
    }

    /// Status the vehicle ends in.
    pub const fn vehicle_status(&self) -> VehicleStatus {
        match self {
            PaymentOutcome::Paid => VehicleStatus::Sold,
            PaymentOutcome::Cancelled => VehicleStatus::Available,
        }
    }
}

/// Case-insensitive; surrounding whitespace is ignored.
impl FromStr for PaymentOutcome {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentOutcome::Paid),
            "cancelled" => Ok(PaymentOutcome::Cancelled),
            _ => Err(ValidationError::rejected(
                "Status",
                format!("Invalid payment status: {raw}"),
            )),
        }
    }
}

// =============================================================================
// Settlement Decision
// =============================================================================

/// What the reconciler should do with a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Move both rows to their settled states.
    Apply {
        payment: PaymentStatus,
        vehicle: VehicleStatus,
    },
    /// The payment already carries this outcome.
    AlreadyApplied,
    /// State does not allow this outcome; nothing changes.
    Ignored { reason: String },
}

/// Decides how a webhook outcome applies to the current payment and vehicle.
pub fn settle(
    outcome: PaymentOutcome,
    payment_status: PaymentStatus,
    vehicle_status: VehicleStatus,
) -> Settlement {
    if payment_status == outcome.payment_status() {
        return Settlement::AlreadyApplied;
    }

    match (payment_status, vehicle_status) {
        (PaymentStatus::Pending, VehicleStatus::Reserved) => Settlement::Apply {
            payment: outcome.payment_status(),
            vehicle: outcome.vehicle_status(),
        },
        (PaymentStatus::Pending, vehicle) => Settlement::Ignored {
            reason: format!("vehicle is {vehicle}, expected Reserved"),
        },
        (payment, _) => Settlement::Ignored {
            reason: format!("payment already settled as {payment:?}"),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
