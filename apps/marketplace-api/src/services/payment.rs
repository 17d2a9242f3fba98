//! # Payment Service
//!
//! Settles pending payments from gateway webhooks.
//!
//! ## Settlement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (Payment, Vehicle)       outcome       →  (Payment, Vehicle)          │
//! │  (Pending, Reserved)      paid          →  (Completed, Sold)           │
//! │  (Pending, Reserved)      cancelled     →  (Cancelled, Available)      │
//! │  already at target        either        →  unchanged, success          │
//! │  anything else            either        →  unchanged, logged, success  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both rows change in one immediate transaction, so concurrent deliveries
//! of the same webhook run one after the other: the second reads the
//! settled rows and reports `already_applied`. The UPDATEs are still guarded
//! on the status read at the start.

use chrono::Utc;
use motorhub_core::payment::settle;
use motorhub_core::{CoreError, Payment, PaymentOutcome, Settlement};
use motorhub_db::repository::{payment, vehicle};
use motorhub_db::{commit, Database, DbError};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ServiceResult;

/// What a webhook did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOutcome {
    Applied,
    AlreadyApplied,
    Ignored,
}

/// Payment settlement and lookup.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    pub fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Applies a gateway outcome to the payment `transaction_id` of a sale.
    ///
    /// Re-delivery of an applied outcome and outcomes the current state
    /// cannot take are both successes that change nothing.
    pub async fn reconcile(
        &self,
        sale_id: Uuid,
        transaction_id: &str,
        outcome: PaymentOutcome,
    ) -> ServiceResult<SettlementOutcome> {
        debug!(sale_id = %sale_id, transaction_id, ?outcome, "Reconciling payment");

        let now = Utc::now();
        let mut tx = self.db.begin_immediate().await?;

        let pending = payment::find_by_transaction(&mut tx, sale_id, transaction_id)
            .await?
            .ok_or_else(|| {
                CoreError::not_found("Payment", format!("Transaction ID: {transaction_id}"))
            })?;

        let reserved = vehicle::find_by_sale_id(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Vehicle", format!("Sale ID: {sale_id}")))?;

        match settle(outcome, pending.status, reserved.status) {
            Settlement::Apply {
                payment: payment_to,
                vehicle: vehicle_to,
            } => {
                if !payment::transition_status(&mut tx, pending.id, pending.status, payment_to, now)
                    .await?
                {
                    return Err(DbError::stale("Payment", pending.id).into());
                }
                if !vehicle::transition_status(&mut tx, reserved.id, reserved.status, vehicle_to, now)
                    .await?
                {
                    return Err(DbError::stale("Vehicle", reserved.id).into());
                }

                commit(tx).await?;

                info!(
                    sale_id = %sale_id,
                    payment_id = %pending.id,
                    vehicle_id = %reserved.id,
                    payment_status = ?payment_to,
                    vehicle_status = %vehicle_to,
                    "Payment settled"
                );
                Ok(SettlementOutcome::Applied)
            }
            Settlement::AlreadyApplied => {
                debug!(payment_id = %pending.id, ?outcome, "Outcome already applied");
                Ok(SettlementOutcome::AlreadyApplied)
            }
            Settlement::Ignored { reason } => {
                warn!(
                    sale_id = %sale_id,
                    payment_id = %pending.id,
                    ?outcome,
                    reason = %reason,
                    "Webhook ignored"
                );
                Ok(SettlementOutcome::Ignored)
            }
        }
    }

    /// Lists the payments recorded for a sale.
    pub async fn payments_for_sale(&self, sale_id: Uuid) -> ServiceResult<Vec<Payment>> {
        let mut conn = self.db.acquire().await?;
        Ok(payment::list_by_sale(&mut conn, sale_id).await?)
    }
}
