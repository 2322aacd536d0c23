//! Outbound notification abstraction.
//!
//! The order workflow only depends on the outcome of a send. Concrete
//! transports (SMTP in the server) implement [`NotificationSender`]; a send
//! never panics and reports failure as a [`NotificationError`] value.

mod sender;
pub mod templates;

pub use sender::{
    EmailMessage, MockNotificationSender, NotificationError, NotificationPayload,
    NotificationSender, UnconfiguredSender,
};
