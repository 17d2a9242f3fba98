//! # Repository Module
//!
//! SQL for each table, one module per entity.
//!
//! ## Connection-Passing Repositories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every function takes `conn: &mut SqliteConnection`.                   │
//! │                                                                         │
//! │  let mut tx = db.begin_immediate().await?; // Transaction<Sqlite>      │
//! │  vehicle::transition_status(&mut tx, ..)  // derefs to the connection  │
//! │  customer::insert_if_absent(&mut tx, ..)                               │
//! │  sale::insert(&mut tx, ..)                                             │
//! │  payment::insert(&mut tx, ..)                                          │
//! │  commit(tx).await?;                       // all or nothing            │
//! │                                                                         │
//! │  let mut conn = db.acquire().await?;      // PoolConnection<Sqlite>    │
//! │  vehicle::find_by_id(&mut conn, id)       // single read               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conditional Updates
//! Status changes are written as `UPDATE .. WHERE id = ? AND status = ?` and
//! report whether a row changed. A `false` means another writer got there
//! first; the caller re-reads to decide between NotFound, Conflict and no-op.
//!
//! ## Available Repositories
//!
//! - [`vehicle`] - Listing, reservation and edit writes
//! - [`customer`] - Lookup and insert-or-keep by CPF
//! - [`salesperson`] - House salesperson provisioning
//! - [`sale`] - Sale rows
//! - [`payment`] - Payment rows and settlement writes

pub mod customer;
pub mod payment;
pub mod sale;
pub mod salesperson;
pub mod vehicle;
