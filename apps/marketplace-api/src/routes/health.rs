//! Liveness and database health.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub database: bool,
    pub migrations_embedded: usize,
    pub migrations_applied: usize,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health`
///
/// 200 when the database answers and every embedded migration is applied,
/// 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let database = state.db.health_check().await;
    let (embedded, applied) = match state.db.migration_status().await {
        Ok(counts) => counts,
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (0, 0)
        }
    };

    let healthy = database && embedded > 0 && applied == embedded;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let report = HealthReport {
        status: if healthy { "healthy" } else { "unhealthy" },
        database,
        migrations_embedded: embedded,
        migrations_applied: applied,
        timestamp: Utc::now(),
    };

    (status, Json(report))
}
