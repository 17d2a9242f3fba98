//! # Domain Types
//!
//! Core domain types used throughout the marketplace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Vehicle      │   │      Sale       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  vehicle_id     │◄──│  sale_id        │       │
//! │  │  vin_number     │   │  customer_id ───┼─┐ │  transaction_id │       │
//! │  │  status         │   │  salesperson_id ┼┐│ │  payment_type   │       │
//! │  │  sale_price     │   │  total_amount   │││ │  status         │       │
//! │  └─────────────────┘   └─────────────────┘││ └─────────────────┘       │
//! │                                           ││                           │
//! │  ┌─────────────────┐   ┌─────────────────┐││                           │
//! │  │  Salesperson    │◄──┼─────────────────┘│                           │
//! │  │  employee_code  │   │    Customer     │◄┘                           │
//! │  │  commission_bps │   │  document (CPF) │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Vehicle Lifecycle
//! ```text
//! Available ──register sale──► Reserved ──webhook "paid"──────► Sold
//!     ▲                            │
//!     └────webhook "cancelled"─────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::payment;
use crate::validation;
use crate::{
    DEFAULT_CUSTOMER_NAME, HOUSE_SALESPERSON_CODE, HOUSE_SALESPERSON_EMAIL,
    HOUSE_SALESPERSON_NAME, MARKETPLACE_SALE_NOTES,
};

// =============================================================================
// Vehicle Status
// =============================================================================

/// Where a vehicle sits in the sales lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Listed and free to be reserved or edited.
    Available,
    /// Held by a sale whose payment is pending.
    Reserved,
    /// Paid for. Terminal.
    Sold,
    /// Temporarily off the lot.
    InMaintenance,
    /// Withdrawn from sale.
    Unavailable,
}

impl VehicleStatus {
    /// Whether an edit may move a vehicle into this status.
    ///
    /// `Reserved` and `Sold` are only reachable through the sale workflow.
    pub const fn is_manually_assignable(&self) -> bool {
        matches!(
            self,
            VehicleStatus::Available | VehicleStatus::InMaintenance | VehicleStatus::Unavailable
        )
    }
}

impl Default for VehicleStatus {
    fn default() -> Self {
        VehicleStatus::Available
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleStatus::Available => "Available",
            VehicleStatus::Reserved => "Reserved",
            VehicleStatus::Sold => "Sold",
            VehicleStatus::InMaintenance => "InMaintenance",
            VehicleStatus::Unavailable => "Unavailable",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// How the buyer intends to pay.
///
/// Travels over JSON as its numeric code (`2` for credit card) and is stored
/// as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(try_from = "u8", into = "u8")]
pub enum PaymentType {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Financing,
    Check,
}

impl PaymentType {
    /// Numeric code (1-6).
    pub const fn code(&self) -> u8 {
        match self {
            PaymentType::Cash => 1,
            PaymentType::CreditCard => 2,
            PaymentType::DebitCard => 3,
            PaymentType::BankTransfer => 4,
            PaymentType::Financing => 5,
            PaymentType::Check => 6,
        }
    }
}

impl Default for PaymentType {
    fn default() -> Self {
        PaymentType::CreditCard
    }
}

impl TryFrom<u8> for PaymentType {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PaymentType::Cash),
            2 => Ok(PaymentType::CreditCard),
            3 => Ok(PaymentType::DebitCard),
            4 => Ok(PaymentType::BankTransfer),
            5 => Ok(PaymentType::Financing),
            6 => Ok(PaymentType::Check),
            other => Err(ValidationError::rejected(
                "PaymentType",
                format!("Invalid payment type: {other}"),
            )),
        }
    }
}

impl From<PaymentType> for u8 {
    fn from(payment_type: PaymentType) -> Self {
        payment_type.code()
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentType::Cash => "Cash",
            PaymentType::CreditCard => "CreditCard",
            PaymentType::DebitCard => "DebitCard",
            PaymentType::BankTransfer => "BankTransfer",
            PaymentType::Financing => "Financing",
            PaymentType::Check => "Check",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Vehicle
// =============================================================================

/// A vehicle listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Unique identifier (UUID v4).
    #[ts(as = "String")]
    pub id: Uuid,

    /// Vehicle identification number. Unique.
    pub vin_number: String,

    /// License plate. Unique.
    pub license_plate: String,

    /// Odometer reading in kilometres.
    pub mileage: i64,

    /// What the dealership paid, in cents.
    pub purchase_price_cents: i64,

    /// Asking price in cents. Becomes the sale total.
    pub sale_price_cents: i64,

    pub status: VehicleStatus,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Returns the asking price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Checks the vehicle may be reserved for a sale.
    pub fn ensure_reservable(&self) -> CoreResult<()> {
        if self.status != VehicleStatus::Available {
            return Err(CoreError::conflict("Vehicle is not available for sale"));
        }
        Ok(())
    }

    /// Checks the vehicle may be edited. Only Available vehicles are.
    pub fn ensure_editable(&self) -> CoreResult<()> {
        if self.status != VehicleStatus::Available {
            return Err(CoreError::vehicle_not_editable());
        }
        Ok(())
    }
}

/// Fields supplied when listing a new vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub vin_number: String,
    pub license_plate: String,
    #[serde(default)]
    pub mileage: i64,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewVehicle {
    /// Validates and trims the fields.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let vin_number = validation::validate_identifier("vinNumber", &self.vin_number, 17)?;
        let license_plate =
            validation::validate_identifier("licensePlate", &self.license_plate, 10)?;
        validation::validate_mileage(self.mileage)?;
        validation::validate_prices(self.purchase_price_cents, self.sale_price_cents)?;

        Ok(NewVehicle {
            vin_number,
            license_plate,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            ..self
        })
    }

    /// Builds an available vehicle with a fresh id.
    pub fn into_vehicle(self, now: DateTime<Utc>) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            vin_number: self.vin_number,
            license_plate: self.license_plate,
            mileage: self.mileage,
            purchase_price_cents: self.purchase_price_cents,
            sale_price_cents: self.sale_price_cents,
            status: VehicleStatus::Available,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Replacement fields for an edit of an available vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdate {
    #[serde(flatten)]
    pub fields: NewVehicle,
    /// Defaults to keeping the vehicle Available.
    #[serde(default)]
    pub status: VehicleStatus,
}

impl VehicleUpdate {
    /// Validates the fields and the requested status.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if !self.status.is_manually_assignable() {
            return Err(ValidationError::rejected(
                "Status",
                format!("Status {} can only be set by the sale workflow", self.status),
            ));
        }

        Ok(VehicleUpdate {
            fields: self.fields.validate()?,
            status: self.status,
        })
    }

    /// Applies the edit to the stored vehicle, keeping its id and creation time.
    pub fn apply_to(self, current: &Vehicle, now: DateTime<Utc>) -> Vehicle {
        Vehicle {
            id: current.id,
            vin_number: self.fields.vin_number,
            license_plate: self.fields.license_plate,
            mileage: self.fields.mileage,
            purchase_price_cents: self.fields.purchase_price_cents,
            sale_price_cents: self.fields.sale_price_cents,
            status: self.status,
            notes: self.fields.notes,
            created_at: current.created_at,
            updated_at: now,
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A buyer, identified by their normalized CPF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[ts(as = "String")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Eleven digits, no punctuation. Unique when present.
    pub document: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Builds a new active customer for a normalized document.
    ///
    /// Missing contact details fall back to the name `Customer` and an empty
    /// email.
    pub fn from_document(
        document: impl Into<String>,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Customer {
            id: Uuid::new_v4(),
            name: name.unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
            email: email.unwrap_or_default(),
            phone,
            address: None,
            document: Some(document.into()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Salesperson
// =============================================================================

/// A member of the sales team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Salesperson {
    #[ts(as = "String")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Business identifier, unique when present.
    pub employee_code: Option<String>,
    /// Basis points, 150 = 1.5%. Marketplace sales record no commission.
    pub commission_rate_bps: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Salesperson {
    /// The house salesperson credited with marketplace sales.
    pub fn house(now: DateTime<Utc>) -> Self {
        Salesperson {
            id: Uuid::new_v4(),
            name: HOUSE_SALESPERSON_NAME.to_string(),
            email: HOUSE_SALESPERSON_EMAIL.to_string(),
            phone: None,
            employee_code: Some(HOUSE_SALESPERSON_CODE.to_string()),
            commission_rate_bps: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A registered sale of one vehicle to one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub vehicle_id: Uuid,
    #[ts(as = "String")]
    pub customer_id: Uuid,
    #[ts(as = "String")]
    pub salesperson_id: Uuid,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    /// Vehicle sale price at the moment of reservation.
    pub total_amount_cents: i64,
    pub commission_amount_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Builds a marketplace sale for a reserved vehicle.
    ///
    /// The total is the vehicle's sale price; commission is always zero.
    pub fn marketplace(
        vehicle: &Vehicle,
        customer_id: Uuid,
        salesperson_id: Uuid,
        sale_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Sale {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            customer_id,
            salesperson_id,
            sale_date,
            total_amount_cents: vehicle.sale_price_cents,
            commission_amount_cents: 0,
            notes: Some(MARKETPLACE_SALE_NOTES.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards a sale, settled by the gateway webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub sale_id: Uuid,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    #[ts(type = "number")]
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    /// External reference sent to the gateway, `PAY_<sale id hex>`.
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Builds the pending payment that accompanies a new sale.
    ///
    /// Amount and date mirror the sale; the transaction id is derived from
    /// the sale id.
    pub fn pending_for(sale: &Sale, payment_type: PaymentType, now: DateTime<Utc>) -> Self {
        Payment {
            id: Uuid::new_v4(),
            sale_id: sale.id,
            amount_cents: sale.total_amount_cents,
            payment_date: sale.sale_date,
            payment_type,
            status: PaymentStatus::Pending,
            transaction_id: Some(payment::transaction_id(sale.id)),
            notes: Some(payment::pending_notes(payment_type)),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
