//! Bookloop Core - Domain entities, services, and traits.
//!
//! This crate contains the order lifecycle and follow-up automation logic for
//! the Bookloop marketplace. It is database-agnostic and defines traits that
//! are implemented by the `storage-sqlite` crate; outbound email is abstracted
//! behind [`notifications::NotificationSender`].

pub mod automation;
pub mod books;
pub mod constants;
pub mod errors;
pub mod followups;
pub mod messages;
pub mod notifications;
pub mod orders;
pub mod users;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
