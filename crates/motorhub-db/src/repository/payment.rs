//! # Payment Repository
//!
//! ## Settlement Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(payment)                         status = pending              │
//! │  transition_status(id, Pending → Completed)   webhook "paid"           │
//! │  transition_status(id, Pending → Cancelled)   webhook "cancelled"      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use motorhub_core::{Payment, PaymentStatus};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Records a payment.
pub async fn insert(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
    debug!(
        sale_id = %payment.sale_id,
        amount = %payment.amount_cents,
        transaction_id = ?payment.transaction_id,
        "Recording payment"
    );

    sqlx::query(
        r#"
        INSERT INTO payments (
            id, sale_id, amount_cents, payment_date, payment_type, status,
            transaction_id, notes, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(payment.id)
    .bind(payment.sale_id)
    .bind(payment.amount_cents)
    .bind(payment.payment_date)
    .bind(payment.payment_type)
    .bind(payment.status)
    .bind(&payment.transaction_id)
    .bind(&payment.notes)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets all payments for a sale, oldest first.
pub async fn list_by_sale(conn: &mut SqliteConnection, sale_id: Uuid) -> DbResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, sale_id, amount_cents, payment_date, payment_type, status,
               transaction_id, notes, created_at, updated_at
        FROM payments
        WHERE sale_id = ?1
        ORDER BY created_at ASC
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(payments)
}

/// Gets the payment of a sale carrying the given transaction id.
pub async fn find_by_transaction(
    conn: &mut SqliteConnection,
    sale_id: Uuid,
    transaction_id: &str,
) -> DbResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, sale_id, amount_cents, payment_date, payment_type, status,
               transaction_id, notes, created_at, updated_at
        FROM payments
        WHERE sale_id = ?1 AND transaction_id = ?2
        "#,
    )
    .bind(sale_id)
    .bind(transaction_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(payment)
}

/// Moves a payment from one status to another.
///
/// Returns `false` when the payment doesn't exist or isn't in `from`.
pub async fn transition_status(
    conn: &mut SqliteConnection,
    id: Uuid,
    from: PaymentStatus,
    to: PaymentStatus,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, ?from, ?to, "Transitioning payment status");

    let result = sqlx::query(
        r#"
        UPDATE payments SET
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

/// Counts all payments.
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
