//! Sale endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use motorhub_core::Sale;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{RegisterSale, RegisteredSale};
use crate::AppState;

/// `POST /api/sales/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterSale>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredSale>), ApiError> {
    let Json(request) = payload?;
    let registered = state.sales.register(request).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// `GET /api/sales/:id`
pub async fn get(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Sale>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.sales.get(id).await?))
}
