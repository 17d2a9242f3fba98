//! # Vehicle Repository
//!
//! ## Status Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transition_status(id, Available → Reserved)   reservation gate        │
//! │  transition_status(id, Reserved  → Sold)       webhook "paid"          │
//! │  transition_status(id, Reserved  → Available)  webhook "cancelled"     │
//! │  update_if_available(vehicle)                  edit guard              │
//! │                                                                         │
//! │  Each is one UPDATE guarded on the expected status; `false` means no   │
//! │  row matched.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use motorhub_core::{Vehicle, VehicleStatus};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Inserts a new vehicle.
pub async fn insert(conn: &mut SqliteConnection, vehicle: &Vehicle) -> DbResult<()> {
    debug!(id = %vehicle.id, vin = %vehicle.vin_number, "Inserting vehicle");

    sqlx::query(
        r#"
        INSERT INTO vehicles (
            id, vin_number, license_plate, mileage,
            purchase_price_cents, sale_price_cents, status, notes,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(vehicle.id)
    .bind(&vehicle.vin_number)
    .bind(&vehicle.license_plate)
    .bind(vehicle.mileage)
    .bind(vehicle.purchase_price_cents)
    .bind(vehicle.sale_price_cents)
    .bind(vehicle.status)
    .bind(&vehicle.notes)
    .bind(vehicle.created_at)
    .bind(vehicle.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a vehicle by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Vehicle>> {
    debug!(id = %id, "Getting vehicle by ID");

    let vehicle = sqlx::query_as::<_, Vehicle>(
        r#"
        SELECT id, vin_number, license_plate, mileage,
               purchase_price_cents, sale_price_cents, status, notes,
               created_at, updated_at
        FROM vehicles
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(vehicle)
}

/// Gets the vehicle a sale was registered for.
pub async fn find_by_sale_id(
    conn: &mut SqliteConnection,
    sale_id: Uuid,
) -> DbResult<Option<Vehicle>> {
    let vehicle = sqlx::query_as::<_, Vehicle>(
        r#"
        SELECT v.id, v.vin_number, v.license_plate, v.mileage,
               v.purchase_price_cents, v.sale_price_cents, v.status, v.notes,
               v.created_at, v.updated_at
        FROM vehicles v
        JOIN sales s ON s.vehicle_id = v.id
        WHERE s.id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(vehicle)
}

/// Whether a vehicle with this ID exists.
pub async fn exists(conn: &mut SqliteConnection, id: Uuid) -> DbResult<bool> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(found)
}

/// Lists vehicles, optionally filtered by status.
///
/// Ordered by sale price (cheapest first) when `order_by_price` is set,
/// otherwise newest first.
pub async fn list(
    conn: &mut SqliteConnection,
    status: Option<VehicleStatus>,
    order_by_price: bool,
) -> DbResult<Vec<Vehicle>> {
    let sql = if order_by_price {
        r#"
        SELECT id, vin_number, license_plate, mileage,
               purchase_price_cents, sale_price_cents, status, notes,
               created_at, updated_at
        FROM vehicles
        WHERE ?1 IS NULL OR status = ?1
        ORDER BY sale_price_cents ASC, created_at ASC
        "#
    } else {
        r#"
        SELECT id, vin_number, license_plate, mileage,
               purchase_price_cents, sale_price_cents, status, notes,
               created_at, updated_at
        FROM vehicles
        WHERE ?1 IS NULL OR status = ?1
        ORDER BY created_at DESC
        "#
    };

    let vehicles = sqlx::query_as::<_, Vehicle>(sql)
        .bind(status)
        .fetch_all(&mut *conn)
        .await?;

    Ok(vehicles)
}

/// Moves a vehicle from one status to another.
///
/// Returns `false` when the vehicle doesn't exist or isn't in `from`.
pub async fn transition_status(
    conn: &mut SqliteConnection,
    id: Uuid,
    from: VehicleStatus,
    to: VehicleStatus,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, ?from, ?to, "Transitioning vehicle status");

    let result = sqlx::query(
        r#"
        UPDATE vehicles SET
            status = ?3,
            updated_at = ?4
        WHERE id = ?1 AND status = ?2
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites the editable fields of a vehicle that is still Available.
///
/// Returns `false` when the vehicle doesn't exist or has left Available.
pub async fn update_if_available(conn: &mut SqliteConnection, vehicle: &Vehicle) -> DbResult<bool> {
    debug!(id = %vehicle.id, "Updating available vehicle");

    let result = sqlx::query(
        r#"
        UPDATE vehicles SET
            vin_number = ?2,
            license_plate = ?3,
            mileage = ?4,
            purchase_price_cents = ?5,
            sale_price_cents = ?6,
            status = ?7,
            notes = ?8,
            updated_at = ?9
        WHERE id = ?1 AND status = 'available'
        "#,
    )
    .bind(vehicle.id)
    .bind(&vehicle.vin_number)
    .bind(&vehicle.license_plate)
    .bind(vehicle.mileage)
    .bind(vehicle.purchase_price_cents)
    .bind(vehicle.sale_price_cents)
    .bind(vehicle.status)
    .bind(&vehicle.notes)
    .bind(vehicle.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
