//! # Sale Repository
//!
//! Sale rows are written once at registration; the vehicle and payment carry
//! the lifecycle afterwards.

use motorhub_core::Sale;
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Inserts a sale.
pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, vehicle_id = %sale.vehicle_id, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, vehicle_id, customer_id, salesperson_id, sale_date,
            total_amount_cents, commission_amount_cents, notes,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(sale.id)
    .bind(sale.vehicle_id)
    .bind(sale.customer_id)
    .bind(sale.salesperson_id)
    .bind(sale.sale_date)
    .bind(sale.total_amount_cents)
    .bind(sale.commission_amount_cents)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a sale by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, vehicle_id, customer_id, salesperson_id, sale_date,
               total_amount_cents, commission_amount_cents, notes,
               created_at, updated_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Counts all sales.
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
