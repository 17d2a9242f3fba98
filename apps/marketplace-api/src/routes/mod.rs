//! HTTP routes.
//!
//! | Method | Path                          | Handler                  |
//! |--------|-------------------------------|--------------------------|
//! | POST   | `/api/sales/register`         | [`sales::register`]      |
//! | GET    | `/api/sales/:id`              | [`sales::get`]           |
//! | POST   | `/api/payments/webhook`       | [`payments::webhook`]    |
//! | GET    | `/api/payments/sale/:sale_id` | [`payments::for_sale`]   |
//! | POST   | `/api/vehicles`               | [`vehicles::create`]     |
//! | GET    | `/api/vehicles`               | [`vehicles::list`]       |
//! | GET    | `/api/vehicles/:id`           | [`vehicles::get`]        |
//! | PUT    | `/api/vehicles/:id`           | [`vehicles::update`]     |
//! | GET    | `/health`                     | [`health::health`]       |

pub mod health;
pub mod payments;
pub mod sales;
pub mod vehicles;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sales/register", post(sales::register))
        .route("/api/sales/:id", get(sales::get))
        .route("/api/payments/webhook", post(payments::webhook))
        .route("/api/payments/sale/:sale_id", get(payments::for_sale))
        .route("/api/vehicles", post(vehicles::create).get(vehicles::list))
        .route("/api/vehicles/:id", get(vehicles::get).put(vehicles::update))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
