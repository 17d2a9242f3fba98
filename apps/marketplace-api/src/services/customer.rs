//! Customer resolution by CPF.

use chrono::{DateTime, Utc};
use motorhub_core::Customer;
use motorhub_db::repository::customer;
use motorhub_db::DbError;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::ServiceResult;

/// Validated customer fields from a registration request.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetails {
    /// Normalized, checksum-valid CPF.
    pub document: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Returns the customer holding `details.document`, creating one if needed.
///
/// An existing customer is returned as stored; the request's contact fields
/// only fill a newly created record.
pub async fn resolve_or_create(
    conn: &mut SqliteConnection,
    details: &CustomerDetails,
    now: DateTime<Utc>,
) -> ServiceResult<Customer> {
    if let Some(existing) = customer::find_by_document(&mut *conn, &details.document).await? {
        debug!(customer_id = %existing.id, "Existing customer matched by document");
        return Ok(existing);
    }

    let candidate = Customer::from_document(
        details.document.clone(),
        details.name.clone(),
        details.email.clone(),
        details.phone.clone(),
        now,
    );

    if customer::insert_if_absent(&mut *conn, &candidate).await? {
        info!(customer_id = %candidate.id, "Customer created");
        return Ok(candidate);
    }

    // Lost an insert race; the other writer's row stands.
    customer::find_by_document(&mut *conn, &details.document)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", details.document.clone()).into())
}
