//! SQLite storage implementation for Bookloop.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `bookloop-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! Reads go through the r2d2 pool. Every write goes through the single
//! [`WriteHandle`] actor and runs in its own IMMEDIATE transaction, which is
//! what makes the compare-and-set status updates and follow-up claims atomic.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod automation_logs;
pub mod books;
pub mod messages;
pub mod orders;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from bookloop-core for convenience
pub use bookloop_core::errors::{DatabaseError, Error, Result};
