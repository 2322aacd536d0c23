//! SQLite storage implementation for in-app messages.

mod model;
mod repository;

pub use model::{MessageDB, NewMessageDB};
pub use repository::MessageRepository;
