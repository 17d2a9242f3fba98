//! # MotorHub Marketplace API
//!
//! HTTP service for marketplace sales and payment settlement.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Marketplace API Server                            │
//! │                                                                         │
//! │  Front end ──► /api/sales, /api/vehicles ──┐                           │
//! │                                             ├──► Services ──► SQLite   │
//! │  Gateway ────► /api/payments/webhook ──────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use motorhub_core::PaymentLinks;
use motorhub_db::Database;

use crate::services::{PaymentService, SaleService, VehicleService};

pub use routes::router;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub sales: SaleService,
    pub payments: PaymentService,
    pub vehicles: VehicleService,
}

impl AppState {
    pub fn new(db: Database, links: PaymentLinks) -> Arc<Self> {
        Arc::new(AppState {
            sales: SaleService::new(db.clone(), links),
            payments: PaymentService::new(db.clone()),
            vehicles: VehicleService::new(db.clone()),
            db,
        })
    }
}
