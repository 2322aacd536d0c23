use crate::books::{Book, NewBook};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for book repository operations
#[async_trait]
pub trait BookRepositoryTrait: Send + Sync {
    fn get_book(&self, book_id: i64) -> Result<Option<Book>>;
    /// Books that are available and not archived.
    fn list_available_books(&self) -> Result<Vec<Book>>;
    async fn create_book(&self, new_book: NewBook) -> Result<Book>;
}
