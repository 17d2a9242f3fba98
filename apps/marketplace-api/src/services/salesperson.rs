//! House salesperson provisioning.

use chrono::{DateTime, Utc};
use motorhub_core::{Salesperson, HOUSE_SALESPERSON_CODE};
use motorhub_db::repository::salesperson;
use motorhub_db::DbError;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use super::ServiceResult;

/// Id of the salesperson credited with a marketplace sale.
///
/// The longest-serving active salesperson when there is one; otherwise the
/// `SYS001` house record, created on first use. The UNIQUE employee code
/// keeps concurrent first uses down to a single row.
pub async fn default_salesperson_id(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> ServiceResult<Uuid> {
    if let Some(active) = salesperson::first_active(&mut *conn).await? {
        return Ok(active.id);
    }

    let house = Salesperson::house(now);
    if salesperson::insert_if_absent(&mut *conn, &house).await? {
        info!(salesperson_id = %house.id, "House salesperson created");
        return Ok(house.id);
    }

    let existing = salesperson::find_by_employee_code(&mut *conn, HOUSE_SALESPERSON_CODE)
        .await?
        .ok_or_else(|| DbError::not_found("Salesperson", HOUSE_SALESPERSON_CODE))?;

    Ok(existing.id)
}
