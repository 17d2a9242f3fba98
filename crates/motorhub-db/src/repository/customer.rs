//! # Customer Repository
//!
//! Customers are keyed by their normalized CPF (`document`, UNIQUE).

use motorhub_core::Customer;
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Gets a customer by normalized document.
pub async fn find_by_document(
    conn: &mut SqliteConnection,
    document: &str,
) -> DbResult<Option<Customer>> {
    debug!(document = %document, "Looking up customer by document");

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, email, phone, address, document, is_active,
               created_at, updated_at
        FROM customers
        WHERE document = ?1
        "#,
    )
    .bind(document)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(customer)
}

/// Gets a customer by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, email, phone, address, document, is_active,
               created_at, updated_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(customer)
}

/// Inserts a customer unless one with the same document already exists.
///
/// Returns `true` if this call created the row.
pub async fn insert_if_absent(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<bool> {
    debug!(id = %customer.id, "Inserting customer");

    let result = sqlx::query(
        r#"
        INSERT INTO customers (
            id, name, email, phone, address, document, is_active,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(document) DO NOTHING
        "#,
    )
    .bind(customer.id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(&customer.document)
    .bind(customer.is_active)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Counts all customers.
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
