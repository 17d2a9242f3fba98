//! # motorhub-db
//!
//! SQLite persistence for the marketplace: a pooled [`Database`] handle,
//! embedded migrations, and one repository module per table.
//!
//! Repository functions are free functions over `&mut SqliteConnection`, so
//! the same call works on a pooled connection or inside a transaction:
//!
//! ```rust,ignore
//! use motorhub_db::{commit, repository::vehicle, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./motorhub.db")).await?;
//!
//! let mut tx = db.begin_immediate().await?;
//! let reserved = vehicle::transition_status(
//!     &mut tx, id, VehicleStatus::Available, VehicleStatus::Reserved, Utc::now(),
//! ).await?;
//! if reserved {
//!     commit(tx).await?;
//! }
//! ```
//!
//! Status changes are compare-and-set (`WHERE id = ? AND status = ?`) and
//! report whether a row moved; callers decide what a miss means.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{commit, Database, DbConfig};
