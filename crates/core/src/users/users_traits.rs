use crate::errors::Result;
use crate::users::{NewUser, User};
use async_trait::async_trait;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_user(&self, user_id: i64) -> Result<Option<User>>;
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
}
