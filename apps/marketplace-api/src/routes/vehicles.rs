//! Vehicle listing endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use motorhub_core::{NewVehicle, Vehicle, VehicleStatus, VehicleUpdate};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    /// snake_case status, e.g. `available`
    pub status: Option<VehicleStatus>,
    #[serde(default)]
    pub order_by_price: bool,
}

/// `POST /api/vehicles`
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewVehicle>, JsonRejection>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    let Json(listing) = payload?;
    let created = state.vehicles.create(listing).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/vehicles?status=&orderByPrice=`
pub async fn list(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<VehicleFilter>, QueryRejection>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    let Query(filter) = filter?;
    let vehicles = state
        .vehicles
        .list(filter.status, filter.order_by_price)
        .await?;
    Ok(Json(vehicles))
}

/// `GET /api/vehicles/:id`
pub async fn get(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vehicle>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.vehicles.get(id).await?))
}

/// `PUT /api/vehicles/:id`
pub async fn update(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<VehicleUpdate>, JsonRejection>,
) -> Result<Json<Vehicle>, ApiError> {
    let Path(id) = id?;
    let Json(edit) = payload?;
    Ok(Json(state.vehicles.update(id, edit).await?))
}
