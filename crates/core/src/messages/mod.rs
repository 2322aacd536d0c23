//! In-app messages created as side effects of order transitions and follow-ups.

mod messages_model;
mod messages_traits;

pub use messages_model::{Message, NewMessage};
pub use messages_traits::MessageRepositoryTrait;
