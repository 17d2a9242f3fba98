//! Vehicle reservation.

use chrono::{DateTime, Utc};
use motorhub_core::{CoreError, Vehicle, VehicleStatus};
use motorhub_db::repository::vehicle;
use motorhub_db::DbError;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use super::ServiceResult;

/// Moves a vehicle from Available to Reserved and returns it.
///
/// The status change is a single guarded UPDATE, so of two concurrent calls
/// for the same vehicle only one sees a row change. The loser re-reads to
/// report why.
pub async fn reserve_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: Uuid,
    now: DateTime<Utc>,
) -> ServiceResult<Vehicle> {
    let reserved = vehicle::transition_status(
        &mut *conn,
        vehicle_id,
        VehicleStatus::Available,
        VehicleStatus::Reserved,
        now,
    )
    .await?;

    let current = vehicle::find_by_id(&mut *conn, vehicle_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Vehicle", vehicle_id.to_string()))?;

    if reserved {
        info!(vehicle_id = %vehicle_id, price = %current.sale_price(), "Vehicle reserved");
        return Ok(current);
    }

    current.ensure_reservable()?;
    // Available again by the time we re-read; let the caller retry.
    Err(DbError::stale("Vehicle", vehicle_id).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{fixtures, ServiceError};

    #[tokio::test]
    async fn test_reserves_available_vehicle() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;
        let mut conn = db.acquire().await.unwrap();

        let reserved = reserve_vehicle(&mut conn, listed.id, Utc::now()).await.unwrap();
        assert_eq!(reserved.status, VehicleStatus::Reserved);
        assert_eq!(reserved.sale_price_cents, 5_200_000);
    }

    #[tokio::test]
    async fn test_second_reservation_conflicts() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;
        let mut conn = db.acquire().await.unwrap();

        reserve_vehicle(&mut conn, listed.id, Utc::now()).await.unwrap();
        let err = reserve_vehicle(&mut conn, listed.id, Utc::now()).await.unwrap_err();

        match err {
            ServiceError::Domain(CoreError::Conflict(message)) => {
                assert_eq!(message, "Vehicle is not available for sale")
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_not_found() {
        let db = fixtures::database().await;
        let mut conn = db.acquire().await.unwrap();

        let err = reserve_vehicle(&mut conn, Uuid::new_v4(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::NotFound { .. })));
    }
}
