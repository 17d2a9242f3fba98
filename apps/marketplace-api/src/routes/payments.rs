//! Payment endpoints, including the gateway webhook.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use motorhub_core::validation::validate_transaction_id;
use motorhub_core::{Payment, PaymentOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::SettlementOutcome;
use crate::AppState;

/// Body the gateway posts when a payment settles.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhook {
    pub transaction_id: String,
    /// `paid` or `cancelled`, any case.
    pub status: String,
    pub sale_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub message: &'static str,
    pub outcome: SettlementOutcome,
    pub timestamp: DateTime<Utc>,
}

/// `POST /api/payments/webhook`
///
/// The status is decoded first, before the transaction id is checked or
/// anything is looked up, so an unknown status always reports on `Status`.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PaymentWebhook>, JsonRejection>,
) -> Result<Json<WebhookAck>, ApiError> {
    let Json(webhook) = payload?;
    let outcome: PaymentOutcome = webhook.status.parse()?;
    validate_transaction_id(&webhook.transaction_id)?;

    let outcome = state
        .payments
        .reconcile(webhook.sale_id, webhook.transaction_id.trim(), outcome)
        .await?;

    Ok(Json(WebhookAck {
        message: "Webhook processed successfully",
        outcome,
        timestamp: Utc::now(),
    }))
}

/// `GET /api/payments/sale/:sale_id`
pub async fn for_sale(
    State(state): State<Arc<AppState>>,
    sale_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let Path(sale_id) = sale_id?;
    Ok(Json(state.payments.payments_for_sale(sale_id).await?))
}
