//! # Vehicle Service
//!
//! Listing maintenance for the marketplace inventory. Edits are only
//! accepted while a vehicle is Available; Reserved and Sold are owned by the
//! sale workflow.

use chrono::Utc;
use motorhub_core::{CoreError, NewVehicle, Vehicle, VehicleStatus, VehicleUpdate};
use motorhub_db::repository::vehicle;
use motorhub_db::{Database, DbError};
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct VehicleService {
    db: Database,
}

impl VehicleService {
    pub fn new(db: Database) -> Self {
        VehicleService { db }
    }

    /// Lists a new vehicle as Available.
    pub async fn create(&self, listing: NewVehicle) -> ServiceResult<Vehicle> {
        let created = listing.validate()?.into_vehicle(Utc::now());

        let mut conn = self.db.acquire().await?;
        vehicle::insert(&mut conn, &created)
            .await
            .map_err(|e| duplicate_as_conflict(e, &created))?;

        info!(vehicle_id = %created.id, vin = %created.vin_number, "Vehicle listed");
        Ok(created)
    }

    /// Gets a vehicle by id.
    pub async fn get(&self, id: Uuid) -> ServiceResult<Vehicle> {
        let mut conn = self.db.acquire().await?;
        vehicle::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Vehicle", id.to_string()).into())
    }

    /// Lists vehicles, optionally by status, newest first or cheapest first.
    pub async fn list(
        &self,
        status: Option<VehicleStatus>,
        order_by_price: bool,
    ) -> ServiceResult<Vec<Vehicle>> {
        let mut conn = self.db.acquire().await?;
        Ok(vehicle::list(&mut conn, status, order_by_price).await?)
    }

    /// Replaces the editable fields of an Available vehicle.
    pub async fn update(&self, id: Uuid, edit: VehicleUpdate) -> ServiceResult<Vehicle> {
        let edit = edit.validate()?;

        let mut conn = self.db.acquire().await?;
        let current = vehicle::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Vehicle", id.to_string()))?;
        current.ensure_editable()?;

        let edited = edit.apply_to(&current, Utc::now());
        let written = vehicle::update_if_available(&mut conn, &edited)
            .await
            .map_err(|e| duplicate_as_conflict(e, &edited))?;

        if !written {
            // Reserved or removed between the read and the write
            if !vehicle::exists(&mut conn, id).await? {
                return Err(CoreError::not_found("Vehicle", id.to_string()).into());
            }
            return Err(CoreError::vehicle_not_editable().into());
        }

        info!(vehicle_id = %id, status = %edited.status, "Vehicle updated");
        Ok(edited)
    }
}

fn duplicate_as_conflict(err: DbError, vehicle: &Vehicle) -> ServiceError {
    match err {
        DbError::UniqueViolation { field, .. } if field.ends_with("vin_number") => {
            CoreError::conflict(format!(
                "A vehicle with VIN '{}' already exists",
                vehicle.vin_number
            ))
            .into()
        }
        DbError::UniqueViolation { field, .. } if field.ends_with("license_plate") => {
            CoreError::conflict(format!(
                "A vehicle with license plate '{}' already exists",
                vehicle.license_plate
            ))
            .into()
        }
        other => other.into(),
    }
}
