//! SQLite storage implementation for book listings.

mod model;
mod repository;

pub use model::{BookDB, NewBookDB};
pub use repository::BookRepository;
