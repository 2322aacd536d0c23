use crate::errors::Result;
use crate::messages::{Message, NewMessage};
use async_trait::async_trait;

/// Trait for in-app message repository operations
#[async_trait]
pub trait MessageRepositoryTrait: Send + Sync {
    async fn create_message(&self, new_message: NewMessage) -> Result<Message>;
    /// Messages received by a user, newest first.
    fn list_messages_for_user(&self, user_id: i64) -> Result<Vec<Message>>;
    fn list_messages_for_order(&self, order_id: i64) -> Result<Vec<Message>>;
}
