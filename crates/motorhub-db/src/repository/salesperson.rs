//! # Salesperson Repository

use motorhub_core::Salesperson;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Gets the longest-serving active salesperson, if any.
pub async fn first_active(conn: &mut SqliteConnection) -> DbResult<Option<Salesperson>> {
    let salesperson = sqlx::query_as::<_, Salesperson>(
        r#"
        SELECT id, name, email, phone, employee_code, commission_rate_bps,
               is_active, created_at, updated_at
        FROM salespeople
        WHERE is_active = 1
        ORDER BY created_at ASC, id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(&mut *conn)
    .await?;

    Ok(salesperson)
}

/// Gets a salesperson by employee code.
pub async fn find_by_employee_code(
    conn: &mut SqliteConnection,
    employee_code: &str,
) -> DbResult<Option<Salesperson>> {
    let salesperson = sqlx::query_as::<_, Salesperson>(
        r#"
        SELECT id, name, email, phone, employee_code, commission_rate_bps,
               is_active, created_at, updated_at
        FROM salespeople
        WHERE employee_code = ?1
        "#,
    )
    .bind(employee_code)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(salesperson)
}

/// Inserts a salesperson unless the employee code is taken.
///
/// Returns `true` if this call created the row.
pub async fn insert_if_absent(
    conn: &mut SqliteConnection,
    salesperson: &Salesperson,
) -> DbResult<bool> {
    debug!(
        id = %salesperson.id,
        employee_code = ?salesperson.employee_code,
        "Inserting salesperson"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO salespeople (
            id, name, email, phone, employee_code, commission_rate_bps,
            is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(employee_code) DO NOTHING
        "#,
    )
    .bind(salesperson.id)
    .bind(&salesperson.name)
    .bind(&salesperson.email)
    .bind(&salesperson.phone)
    .bind(&salesperson.employee_code)
    .bind(salesperson.commission_rate_bps)
    .bind(salesperson.is_active)
    .bind(salesperson.created_at)
    .bind(salesperson.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
