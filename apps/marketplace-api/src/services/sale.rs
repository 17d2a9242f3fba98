//! # Sale Service
//!
//! Registers marketplace sales: reserves the vehicle, records the buyer,
//! the sale and a pending payment, and hands back the gateway link.

use chrono::{DateTime, Utc};
use motorhub_core::validation;
use motorhub_core::{CoreError, Payment, PaymentLinks, PaymentType, Sale};
use motorhub_db::repository;
use motorhub_db::{commit, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::customer::{self, CustomerDetails};
use super::{inventory, salesperson, ServiceResult};

/// Body of `POST /api/sales/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSale {
    pub customer_cpf: String,
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    pub vehicle_id: Uuid,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Numeric code; credit card when omitted.
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
}

/// A registered sale with its pending payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredSale {
    pub sale: Sale,
    pub payment: Payment,
    pub transaction_id: String,
    /// Absent for payments settled offline (cash, check).
    pub payment_url: Option<String>,
}

/// Sale registration and lookup.
#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
    links: PaymentLinks,
}

impl SaleService {
    pub fn new(db: Database, links: PaymentLinks) -> Self {
        SaleService { db, links }
    }

    /// Registers a sale of an available vehicle.
    ///
    /// Input is validated before anything is written. The reservation,
    /// customer, salesperson, sale and payment writes then share one
    /// transaction: if any of them fails the vehicle stays Available and
    /// nothing else is kept.
    pub async fn register(&self, request: RegisterSale) -> ServiceResult<RegisteredSale> {
        let document = validation::validate_document(&request.customer_cpf)?;
        let details = CustomerDetails {
            document,
            name: validation::validate_customer_name(request.customer_name.as_deref())?,
            email: validation::validate_customer_email(request.customer_email.as_deref())?,
            phone: validation::validate_customer_phone(request.customer_phone.as_deref())?,
        };
        let payment_type = request.payment_type.unwrap_or_default();

        let now = Utc::now();
        let sale_date = request.sale_date.unwrap_or(now);

        debug!(vehicle_id = %request.vehicle_id, %payment_type, "Registering sale");

        let mut tx = self.db.begin_immediate().await?;

        let vehicle = inventory::reserve_vehicle(&mut tx, request.vehicle_id, now).await?;
        let buyer = customer::resolve_or_create(&mut tx, &details, now).await?;
        let salesperson_id = salesperson::default_salesperson_id(&mut tx, now).await?;

        let sale = Sale::marketplace(&vehicle, buyer.id, salesperson_id, sale_date, now);
        repository::sale::insert(&mut tx, &sale).await?;

        let transaction_id = motorhub_core::payment::transaction_id(sale.id);
        let payment = Payment::pending_for(&sale, payment_type, now);
        repository::payment::insert(&mut tx, &payment).await?;

        commit(tx).await?;

        let payment_url = self.links.url_for(payment_type, &transaction_id);

        info!(
            sale_id = %sale.id,
            vehicle_id = %vehicle.id,
            customer_id = %buyer.id,
            total = %sale.total_amount(),
            transaction_id = %transaction_id,
            "Sale registered"
        );

        Ok(RegisteredSale {
            sale,
            payment,
            transaction_id,
            payment_url,
        })
    }

    /// Gets a sale by id.
    pub async fn get(&self, id: Uuid) -> ServiceResult<Sale> {
        let mut conn = self.db.acquire().await?;
        repository::sale::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{fixtures, ServiceError};
    use chrono::TimeZone;
    use motorhub_core::{PaymentStatus, ValidationError, VehicleStatus};
    use motorhub_db::repository::{customer as customers, payment as payments, sale as sales};

    fn service(db: &Database) -> SaleService {
        SaleService::new(db.clone(), fixtures::links())
    }

    #[tokio::test]
    async fn test_register_reserves_and_records_pending_payment() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;

        let mut request = fixtures::register_request(listed.id, fixtures::CPF);
        request.payment_type = Some(PaymentType::CreditCard);
        let registered = service(&db).register(request).await.unwrap();

        assert_eq!(fixtures::vehicle_status(&db, listed.id).await, VehicleStatus::Reserved);

        let sale = &registered.sale;
        assert_eq!(sale.total_amount_cents, 5_200_000);
        assert_eq!(sale.commission_amount_cents, 0);
        assert_eq!(sale.notes.as_deref(), Some("Sale registered via marketplace"));

        let expected_tx = format!("PAY_{}", sale.id.simple());
        assert_eq!(registered.transaction_id, expected_tx);
        assert_eq!(registered.payment.transaction_id.as_deref(), Some(expected_tx.as_str()));
        assert_eq!(registered.payment.status, PaymentStatus::Pending);
        assert_eq!(registered.payment.amount_cents, 5_200_000);
        assert_eq!(registered.payment.payment_date, sale.sale_date);
        assert_eq!(
            registered.payment_url,
            Some(format!("https://payment-gateway.com/credit-card/{expected_tx}"))
        );

        let mut conn = db.acquire().await.unwrap();
        let buyer = customers::find_by_document(&mut conn, fixtures::CPF_DIGITS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(buyer.id, sale.customer_id);
        assert_eq!(buyer.name, "Customer");
    }

    #[tokio::test]
    async fn test_register_keeps_supplied_sale_date_and_method() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;

        let date = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let mut request = fixtures::register_request(listed.id, fixtures::CPF_DIGITS);
        request.sale_date = Some(date);
        request.payment_type = Some(PaymentType::Cash);
        request.customer_name = Some("Ana Souza".to_string());

        let registered = service(&db).register(request).await.unwrap();

        assert_eq!(registered.sale.sale_date, date);
        assert_eq!(registered.payment.payment_date, date);
        assert_eq!(registered.payment.payment_type, PaymentType::Cash);
        assert_eq!(registered.payment_url, None);
        assert_eq!(
            registered.payment.notes.as_deref(),
            Some("Payment pending for marketplace sale - Cash")
        );
    }

    #[tokio::test]
    async fn test_invalid_document_writes_nothing() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;

        let err = service(&db)
            .register(fixtures::register_request(listed.id, "12345678901"))
            .await
            .unwrap_err();

        match err {
            ServiceError::Domain(CoreError::Validation(e)) => {
                assert_eq!(e, ValidationError::rejected("CustomerCpf", "Invalid CPF format"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(fixtures::vehicle_status(&db, listed.id).await, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn test_invalid_contact_field_writes_nothing() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;

        let mut request = fixtures::register_request(listed.id, fixtures::CPF);
        request.customer_email = Some("not-an-email".to_string());
        let err = service(&db).register(request).await.unwrap_err();

        match err {
            ServiceError::Domain(CoreError::Validation(e)) => assert_eq!(e.field(), "CustomerEmail"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(fixtures::vehicle_status(&db, listed.id).await, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn test_reserved_vehicle_conflicts() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;
        let sales_service = service(&db);

        sales_service
            .register(fixtures::register_request(listed.id, fixtures::CPF))
            .await
            .unwrap();
        let err = sales_service
            .register(fixtures::register_request(listed.id, fixtures::OTHER_CPF))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Domain(CoreError::Conflict(_))));

        let mut conn = db.acquire().await.unwrap();
        assert_eq!(sales::count(&mut conn).await.unwrap(), 1);
        // The losing buyer was never recorded
        assert!(customers::find_by_document(&mut conn, "11144477735")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_have_one_winner() {
        let (_dir, db) = fixtures::shared_database().await;
        let rounds = 10;

        for round in 0..rounds {
            let listed = fixtures::listed_vehicle(&db, &format!("9BWZZZ377VT{round:06}")).await;

            let buyers = [fixtures::CPF, fixtures::OTHER_CPF].map(|cpf| {
                let sales_service = service(&db);
                let request = fixtures::register_request(listed.id, cpf);
                tokio::spawn(async move { sales_service.register(request).await })
            });

            let mut winners = 0;
            for buyer in buyers {
                match buyer.await.unwrap() {
                    Ok(_) => winners += 1,
                    Err(ServiceError::Domain(CoreError::Conflict(_))) => {}
                    Err(other) => panic!("round {round}: unexpected error {other:?}"),
                }
            }
            assert_eq!(winners, 1, "round {round}");
            assert_eq!(fixtures::vehicle_status(&db, listed.id).await, VehicleStatus::Reserved);
        }

        let mut conn = db.acquire().await.unwrap();
        assert_eq!(sales::count(&mut conn).await.unwrap(), rounds);
        assert_eq!(payments::count(&mut conn).await.unwrap(), rounds);
    }

    #[tokio::test]
    async fn test_failure_after_reservation_rolls_back() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;

        sqlx::query("DROP TABLE payments")
            .execute(db.pool())
            .await
            .unwrap();

        let err = service(&db)
            .register(fixtures::register_request(listed.id, fixtures::CPF))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));

        assert_eq!(fixtures::vehicle_status(&db, listed.id).await, VehicleStatus::Available);
        let mut conn = db.acquire().await.unwrap();
        assert_eq!(sales::count(&mut conn).await.unwrap(), 0);
        assert_eq!(customers::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repeat_buyer_and_house_salesperson_are_reused() {
        let db = fixtures::database().await;
        let first_vehicle = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;
        let second_vehicle = fixtures::listed_vehicle(&db, "9BWZZZ377VT004252").await;
        let sales_service = service(&db);

        let mut request = fixtures::register_request(first_vehicle.id, fixtures::CPF);
        request.customer_name = Some("Ana Souza".to_string());
        let first = sales_service.register(request).await.unwrap();

        let mut request = fixtures::register_request(second_vehicle.id, fixtures::CPF_DIGITS);
        request.customer_name = Some("Renamed".to_string());
        let second = sales_service.register(request).await.unwrap();

        assert_eq!(first.sale.customer_id, second.sale.customer_id);
        assert_eq!(first.sale.salesperson_id, second.sale.salesperson_id);

        let mut conn = db.acquire().await.unwrap();
        let buyer = customers::find_by_id(&mut conn, first.sale.customer_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(buyer.name, "Ana Souza");
        assert_eq!(customers::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_sale() {
        let db = fixtures::database().await;
        let listed = fixtures::listed_vehicle(&db, "9BWZZZ377VT004251").await;
        let sales_service = service(&db);

        let registered = sales_service
            .register(fixtures::register_request(listed.id, fixtures::CPF))
            .await
            .unwrap();

        let found = sales_service.get(registered.sale.id).await.unwrap();
        assert_eq!(found.vehicle_id, listed.id);

        let err = sales_service.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::NotFound { .. })));
    }
}
