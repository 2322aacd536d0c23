//! Books module - listing state kept in lockstep with orders.

mod books_model;
mod books_traits;

pub use books_model::{Book, BookEffect, BookStatus, NewBook};
pub use books_traits::BookRepositoryTrait;
